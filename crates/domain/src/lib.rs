//! Shared domain types for the master client: the master's network
//! address, the client configuration model, and the config-loading error.

pub mod address;
pub mod config;
pub mod error;

pub use address::{AddressParseError, MasterAddress};
pub use config::ClientConfig;
pub use error::{Error, Result};
