//! Unified error type.

use std::fmt;
use std::net::AddrParseError;

/// The error type returned by tether's fallible operations.
///
/// Application-level outcomes (404, 405, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: a bad bind address, binding to a port, or a route
/// the radix tree refuses to store.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Addr(AddrParseError),
    Route {
        path: String,
        source: matchit::InsertError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Addr(e) => write!(f, "invalid socket address: {e}"),
            Self::Route { path, source } => write!(f, "invalid route `{path}`: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Addr(e) => Some(e),
            Self::Route { source, .. } => Some(source),
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
