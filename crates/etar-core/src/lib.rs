pub mod config;
pub mod error;
pub mod types;

pub use config::EtarConfig;
pub use error::{EtarError, EtarResult};
pub use types::{LogFormat, Mode};
