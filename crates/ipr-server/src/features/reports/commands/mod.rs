pub mod create;
pub mod delete;
pub mod update_state;

pub use create::{CreateReportCommand, CreateReportError};
pub use delete::DeleteReportError;
pub use update_state::{UpdateReportStateCommand, UpdateReportStateError};
