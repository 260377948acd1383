//! Configuration for the trial harmonizer.
//!
//! Holds the typed settings consumed by each harmonization stage and the layered loader that
//! builds them from `configuration/` files and `APP_`-prefixed environment variables.

mod environment;
mod load;
pub mod shared;

pub use environment::Environment;
pub use load::{Config, LoadConfigError, load_config, load_config_from};
