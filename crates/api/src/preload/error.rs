use core::fmt::{self, Display};
use hyper::{http::uri::InvalidUri, StatusCode};

#[derive(Debug)]
pub enum FetchError {
    /// Not something we are willing to fetch.
    InvalidUri,
    /// The server answered, but not with the image.
    Status(StatusCode),
    /// Connection or body transfer failed.
    Transport,
}

impl From<InvalidUri> for FetchError {
    fn from(_: InvalidUri) -> Self {
        Self::InvalidUri
    }
}

impl From<hyper::Error> for FetchError {
    fn from(_: hyper::Error) -> Self {
        Self::Transport
    }
}

impl From<hyper_util::client::legacy::Error> for FetchError {
    fn from(_: hyper_util::client::legacy::Error) -> Self {
        Self::Transport
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUri => f.write_str("invalid image URI"),
            Self::Status(status) => write!(f, "image server responded with {status}"),
            Self::Transport => f.write_str("failed to fetch the image"),
        }
    }
}

pub type Result<T> = core::result::Result<T, FetchError>;
