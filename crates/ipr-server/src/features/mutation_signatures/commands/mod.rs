pub mod create;
pub mod remove;
pub mod revise;

pub use create::{CreateMutationSignatureCommand, CreateMutationSignatureError};
pub use remove::RemoveMutationSignatureError;
pub use revise::{ReviseMutationSignatureCommand, ReviseMutationSignatureError};
