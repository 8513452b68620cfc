use thiserror::Error;

/// Everything that can go wrong between a key press and a rendered list
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Text for the transient notice line
    pub fn user_message(&self) -> String {
        format!("Error: {}", self)
    }
}

impl From<repofav_api::ApiError> for Error {
    fn from(err: repofav_api::ApiError) -> Self {
        use repofav_api::ApiError;

        match err {
            ApiError::InvalidArgument(msg) => Error::Validation(msg),
            ApiError::Network(e) => Error::Network(e.to_string()),
            ApiError::Server { message, .. } => Error::Server(message),
            ApiError::Parse(e) => Error::Server(format!("unexpected response: {}", e)),
        }
    }
}

impl From<repofav_store::StoreError> for Error {
    fn from(err: repofav_store::StoreError) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
