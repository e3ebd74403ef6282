use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid snowflake node id {node}: must be between 0 and {max}")]
    InvalidNodeId { node: i64, max: i64 },

    #[error("Invalid machine ip: {0}")]
    InvalidMachineIp(String),

    #[error("Invalid timezone offset: {0} seconds")]
    InvalidTimezoneOffset(i32),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
