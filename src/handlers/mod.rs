// Handler modules
pub mod validate;

pub use validate::{ValidateOptions, handle_validate, resolve_settings};
