use thiserror::Error;

pub type EtarResult<T> = Result<T, EtarError>;

#[derive(Debug, Error)]
pub enum EtarError {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
