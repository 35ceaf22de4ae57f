use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Resolution Error - {0}")]
    Resolution(String),

    #[error("Source Error - {0}")]
    Source(String),

    #[error("Delivery Error - {0}")]
    Delivery(String),

    #[error("Delete Error - {0}")]
    Delete(String),

    #[error("Config Error - {0}")]
    Config(String),

    #[error("Join Error - {0}")]
    Join(String),
}
