pub mod get;
pub mod list;

pub use get::GetMutationSignatureError;
pub use list::ListMutationSignaturesError;
