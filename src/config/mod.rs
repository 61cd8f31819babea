//! Run configuration: validated settings plus config file loading.
mod apply;
mod loader;
mod run_config;
pub mod types;


pub use apply::apply_config;
pub use loader::{load_config, load_config_file};
pub use run_config::{BodySource, ClientIdentity, RunConfig, RunMode, TlsSettings};
