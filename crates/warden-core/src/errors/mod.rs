//! Error taxonomy.
//!
//! Collaborator boundaries each get their own enum; everything converges on
//! [`WardenError`] through `From` impls.

mod collection_error;
mod config_error;
mod execution_error;
mod warden_error;

pub use collection_error::CollectionError;
pub use config_error::ConfigError;
pub use execution_error::ExecutionError;
pub use warden_error::{WardenError, WardenResult};
