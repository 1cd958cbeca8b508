use thiserror::Error;

use sidequests_db::DbError;

/// Errors that stop the server from starting or running
#[derive(Error, Debug)]
pub enum ServerError {
    /// Database connection or schema failure
    #[error(transparent)]
    Database(#[from] DbError),

    /// Failed to bind or serve on the listen address
    #[error("Failed to serve on {addr}: {source}")]
    Serve {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

impl ServerError {
    /// Full message including nested database error details
    pub fn full_message(&self) -> String {
        match self {
            ServerError::Database(err) => err.full_message(),
            other => other.to_string(),
        }
    }
}
