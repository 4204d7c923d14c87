use thiserror::Error;

use crate::session::Operation;

/// Error reported by the remote service (or by libdbus when the call
/// could not be dispatched at all).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct RemoteError {
    pub name: String,
    pub message: String,
}

impl RemoteError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// True when the error name ends with `.{suffix}`, e.g. `InProgress`
    /// for `org.bluez.Error.InProgress`.
    pub fn is(&self, suffix: &str) -> bool {
        self.name
            .rsplit('.')
            .next()
            .map_or(false, |last| last == suffix)
    }
}

impl From<dbus::Error> for RemoteError {
    fn from(e: dbus::Error) -> Self {
        Self {
            name: e.name().unwrap_or("org.freedesktop.DBus.Error.Failed").to_string(),
            message: e.message().unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to connect to the system bus: {0}")]
    Connect(#[source] RemoteError),
    #[error("bus session is not open")]
    BusUnavailable,
    #[error("invalid D-Bus name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },
    #[error("{interface}.{method} on {object} ({service}) failed: {cause}")]
    RemoteCallFailed {
        service: String,
        object: String,
        interface: String,
        method: String,
        #[source]
        cause: RemoteError,
    },
    #[error("failed to decode {context}: {reason}")]
    DecodeFailed { context: &'static str, reason: String },
    #[error("object path {0} does not name a device")]
    MalformedIdentifier(String),
    #[error("invalid device address {0:?}")]
    MalformedAddress(String),
    #[error("object tree scan failed: {0}")]
    ScanFailed(#[source] Box<Error>),
    #[error("{operation} failed for {identifier}: {cause}")]
    OperationFailed {
        operation: Operation,
        identifier: String,
        #[source]
        cause: Box<Error>,
    },
}

impl Error {
    pub(crate) fn decode(context: &'static str, reason: impl ToString) -> Self {
        Error::DecodeFailed {
            context,
            reason: reason.to_string(),
        }
    }

    /// The remote error behind this one, if the failure came from the service.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Error::RemoteCallFailed { cause, .. } => Some(cause),
            Error::ScanFailed(inner) => inner.remote(),
            Error::OperationFailed { cause, .. } => cause.remote(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
