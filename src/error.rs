//! Unified error type.

use std::fmt;
use std::net::AddrParseError;

/// The error type returned by strata's fallible operations.
///
/// Handlers never fail; what they have to say goes into a
/// [`Response`](crate::Response). This type surfaces startup failures:
/// a bad listen address or a socket that cannot be bound.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Addr(AddrParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Addr(e) => write!(f, "invalid listen address: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Addr(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<AddrParseError> for Error {
    fn from(e: AddrParseError) -> Self {
        Self::Addr(e)
    }
}
