//! Error taxonomy for the Management Application surface.
//!
//! # Why
//! Every fallible API entry point — path parsing, registry lookups,
//! operation building, IPC, and per-path results inside a response — needs a
//! single stable vocabulary so that CLI tools and application code can map an
//! error to a symbolic code without string matching. `CoreError` is that
//! vocabulary: a closed [`ErrorKind`] discriminant plus an optional human
//! message and an optional underlying cause, in the same
//! code+message+cause-chain shape used throughout this codebase's IPC and
//! transport errors.

use core::fmt;
use std::error::Error as StdError;

/// Stable, closed error discriminant returned at the API surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Success,
    SessionInvalid,
    SessionNotConnected,
    IpcError,
    Timeout,
    OperationInvalid,
    PathInvalid,
    IdInvalid,
    TypeMismatch,
    NotDefined,
    AlreadyDefined,
    ObservationInvalid,
    DefinitionInvalid,
    AddInvalid,
    OutOfMemory,
    Overrun,
    ClientNotFound,
    LwM2MError,
    /// Transport succeeded but one or more per-path results are errors;
    /// the caller must inspect the [`crate::response::Response`].
    Response,
}

impl ErrorKind {
    pub fn is_success(self) -> bool {
        matches!(self, ErrorKind::Success)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Success => "Success",
            ErrorKind::SessionInvalid => "SessionInvalid",
            ErrorKind::SessionNotConnected => "SessionNotConnected",
            ErrorKind::IpcError => "IPCError",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::OperationInvalid => "OperationInvalid",
            ErrorKind::PathInvalid => "PathInvalid",
            ErrorKind::IdInvalid => "IDInvalid",
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::NotDefined => "NotDefined",
            ErrorKind::AlreadyDefined => "AlreadyDefined",
            ErrorKind::ObservationInvalid => "ObservationInvalid",
            ErrorKind::DefinitionInvalid => "DefinitionInvalid",
            ErrorKind::AddInvalid => "AddInvalid",
            ErrorKind::OutOfMemory => "OutOfMemory",
            ErrorKind::Overrun => "Overrun",
            ErrorKind::ClientNotFound => "ClientNotFound",
            ErrorKind::LwM2MError => "LWM2MError",
            ErrorKind::Response => "Response",
        };
        f.write_str(label)
    }
}

/// LWM2M-level error code, carried inside [`ErrorKind::LwM2MError`] per-path
/// results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LwM2MErrorCode {
    BadRequest,
    Unauthorized,
    NotFound,
    MethodNotAllowed,
    InternalError,
    Overrun,
}

impl fmt::Display for LwM2MErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LwM2MErrorCode::BadRequest => "BadRequest",
            LwM2MErrorCode::Unauthorized => "Unauthorized",
            LwM2MErrorCode::NotFound => "NotFound",
            LwM2MErrorCode::MethodNotAllowed => "MethodNotAllowed",
            LwM2MErrorCode::InternalError => "InternalError",
            LwM2MErrorCode::Overrun => "Overrun",
        };
        f.write_str(label)
    }
}

type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// The error type returned by every fallible API call in this crate.
#[derive(Debug)]
pub struct CoreError {
    kind: ErrorKind,
    message: Option<String>,
    cause: Option<Cause>,
}

impl CoreError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            cause: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.kind, message),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl StdError for CoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn StdError + 'static))
    }
}

impl From<ErrorKind> for CoreError {
    fn from(kind: ErrorKind) -> Self {
        CoreError::new(kind)
    }
}

pub type Result<T, E = CoreError> = core::result::Result<T, E>;
