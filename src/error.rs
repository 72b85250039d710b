//! Unified error type.

use std::error::Error as StdError;
use std::fmt;

use tokio::task::JoinError;

/// The error type returned by [`HandlerService`](crate::HandlerService).
///
/// Handlers themselves have no error channel: application failures are
/// written to the response. This type surfaces what happens *around* a
/// handler: the request body could not be read, or the handler task died.
#[derive(Debug)]
pub struct Error(Kind);

#[derive(Debug)]
enum Kind {
    Body(Box<dyn StdError + Send + Sync>),
    Handler(JoinError),
}

impl Error {
    pub(crate) fn body(e: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self(Kind::Body(e.into()))
    }

    /// `true` if reading the request body failed.
    pub fn is_body(&self) -> bool {
        matches!(self.0, Kind::Body(_))
    }

    /// `true` if the handler panicked or was cancelled.
    pub fn is_handler(&self) -> bool {
        matches!(self.0, Kind::Handler(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Kind::Body(e) => write!(f, "request body: {e}"),
            Kind::Handler(e) => write!(f, "handler: {e}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.0 {
            Kind::Body(e) => Some(&**e),
            Kind::Handler(e) => Some(e),
        }
    }
}

impl From<JoinError> for Error {
    fn from(e: JoinError) -> Self {
        Self(Kind::Handler(e))
    }
}
