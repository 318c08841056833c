pub mod create;
pub mod remove;
pub mod revise;

pub use create::{CreateTherapeuticTargetCommand, CreateTherapeuticTargetError};
pub use remove::RemoveTherapeuticTargetError;
pub use revise::{ReviseTherapeuticTargetCommand, ReviseTherapeuticTargetError};
