use sesame_core::auth::DecodeError;
use sesame_core::config::ConfigError;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("{}", .0)]
    Config(#[from] ConfigError),

    #[error("Cookie::{}", .0)]
    Cookie(#[from] DecodeError),
}
