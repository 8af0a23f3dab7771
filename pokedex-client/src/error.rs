use surf::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The request could not be sent or the transport failed mid-flight.
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    /// The endpoint answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    /// The response body could not be decoded into the expected shape.
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ErrorKind {
    pub(crate) fn request(url: &str, err: surf::Error) -> Error {
        ErrorKind::Request {
            url: url.to_string(),
            message: err.to_string(),
        }
        .into()
    }

    pub(crate) fn status(url: &str, status: StatusCode) -> Error {
        ErrorKind::Status {
            url: url.to_string(),
            status,
        }
        .into()
    }

    pub(crate) fn decode(url: &str, err: surf::Error) -> Error {
        ErrorKind::Decode {
            url: url.to_string(),
            message: err.to_string(),
        }
        .into()
    }
}
