pub mod get;
pub mod list;

pub use get::GetPatientError;
pub use list::{ListPatientsError, ListPatientsQuery};
