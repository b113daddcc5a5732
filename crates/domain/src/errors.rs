//! Error types used throughout the client layers
//!
//! Every failure a caller can observe is a [`KeeperError`]. Errors fall into
//! three [`FaultClass`]es: connection faults are transient and retried,
//! semantic faults are answers from the service, and configuration faults are
//! programmer errors caught before anything is sent.

use std::fmt;

use keeper_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use keeper_common::impl_error_classification;
use thiserror::Error;

/// Broad category of a [`KeeperError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultClass {
    /// Transient loss of the session link; safe to retry
    Connection,
    /// The service rejected the request on its merits
    Semantic,
    /// The request was malformed or the client misconfigured
    Configuration,
}

impl fmt::Display for FaultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "connection"),
            Self::Semantic => write!(f, "semantic"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Main error type for Keeper operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeeperError {
    // Connection faults
    #[error("Connection lost")]
    ConnectionLoss,

    #[error("Session expired")]
    SessionExpired,

    #[error("Session moved to another server")]
    SessionMoved,

    #[error("Operation timed out")]
    OperationTimeout,

    // Semantic faults
    #[error("Bad version for {path}: expected {expected}, actual {actual}")]
    BadVersion { path: String, expected: i32, actual: i32 },

    #[error("Node does not exist: {path}")]
    NoNode { path: String },

    #[error("Not authorized for {path}")]
    NoAuth { path: String },

    #[error("Invalid ACL for {path}")]
    InvalidAcl { path: String },

    // Configuration faults
    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Missing option: {0}")]
    MissingOption(String),

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl KeeperError {
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into(), reason: reason.into() }
    }

    pub fn no_node(path: impl Into<String>) -> Self {
        Self::NoNode { path: path.into() }
    }

    pub fn missing_option(option: impl Into<String>) -> Self {
        Self::MissingOption(option.into())
    }

    /// Fault class this error belongs to
    ///
    /// Embedded common errors are connection faults when retryable (timeouts)
    /// and configuration faults otherwise.
    pub fn class(&self) -> FaultClass {
        match self {
            Self::ConnectionLoss
            | Self::SessionExpired
            | Self::SessionMoved
            | Self::OperationTimeout => FaultClass::Connection,
            Self::BadVersion { .. }
            | Self::NoNode { .. }
            | Self::NoAuth { .. }
            | Self::InvalidAcl { .. } => FaultClass::Semantic,
            Self::InvalidPath { .. } | Self::MissingOption(_) => FaultClass::Configuration,
            Self::Common(e) if e.is_retryable() => FaultClass::Connection,
            Self::Common(_) => FaultClass::Configuration,
        }
    }

    pub fn is_connection_fault(&self) -> bool {
        self.class() == FaultClass::Connection
    }
}

impl_error_classification!(KeeperError, Common,
    Self::ConnectionLoss | Self::SessionMoved | Self::OperationTimeout => {
        retryable: true,
        severity: ErrorSeverity::Warning,
        critical: false,
    },
    Self::SessionExpired => {
        retryable: true,  // A fresh session is established on the next acquire
        severity: ErrorSeverity::Warning,
        critical: false,
    },
    Self::BadVersion { .. } | Self::NoNode { .. } => {
        retryable: false,
        severity: ErrorSeverity::Info,
        critical: false,
    },
    Self::NoAuth { .. } | Self::InvalidAcl { .. } => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: false,
    },
    Self::InvalidPath { .. } | Self::MissingOption(_) => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: false,
    }
);

/// Result type alias for Keeper operations
pub type KeeperResult<T> = std::result::Result<T, KeeperError>;
