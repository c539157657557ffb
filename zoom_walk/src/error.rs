use thiserror::Error;

use gallery_core::ConfigError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("could not open window: {0}")]
    Window(String),

    #[error("invalid installation config: {0}")]
    Config(#[from] ConfigError),
}
