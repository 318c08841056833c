pub mod get;
pub mod list;

pub use get::GetTherapeuticTargetError;
pub use list::ListTherapeuticTargetsError;
