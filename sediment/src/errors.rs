use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for sediment operations.
///
/// Each variant describes a category of failure so callers can match on
/// the kind instead of parsing error messages.
///
/// # Examples
///
/// ```rust,ignore
/// use sediment::errors::{SedimentError, ErrorKind, SedimentResult};
///
/// fn example() -> SedimentResult<()> {
///     Err(SedimentError::new("index not found", ErrorKind::IndexNotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Templating errors
    /// A key template could not be constructed or resolved
    TemplateError,

    // Indexing errors
    /// Generic indexing error
    IndexingError,
    /// Index does not exist
    IndexNotFound,

    // ID and identity errors
    /// The provided document id is invalid
    InvalidId,
    /// The requested resource was not found
    NotFound,

    // Operation errors
    /// The operation is not valid in the current context
    InvalidOperation,

    // Data errors
    /// Error encoding or decoding stored data
    EncodingError,
    /// Invalid data type for operation
    InvalidDataType,
    /// Invalid field name
    InvalidFieldName,

    // Constraint violation errors
    /// A unique constraint was violated; carries the offending property name
    UniqueConstraintViolation(String),

    // Validation errors
    /// Schema validation failed
    ValidationError,

    // Model errors
    /// Model does not exist
    ModelNotFound,

    // Store errors
    /// Error from the storage backend
    BackendError,
    /// Store has already been closed
    StoreAlreadyClosed,

    // IO errors
    /// Generic IO error
    IOError,

    // Generic/internal errors - used as fallback
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::TemplateError => write!(f, "Template error"),
            ErrorKind::IndexingError => write!(f, "Indexing error"),
            ErrorKind::IndexNotFound => write!(f, "Index not found"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InvalidDataType => write!(f, "Invalid data type"),
            ErrorKind::InvalidFieldName => write!(f, "Invalid field name"),
            ErrorKind::UniqueConstraintViolation(property) => {
                write!(f, "Unique constraint violation on '{}'", property)
            }
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::ModelNotFound => write!(f, "Model not found"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::StoreAlreadyClosed => write!(f, "Store already closed"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom sediment error type.
///
/// `SedimentError` encapsulates the error message, kind, and an optional
/// cause. It supports error chaining and backtraces for debugging.
///
/// # Examples
///
/// ```rust,ignore
/// use sediment::errors::{SedimentError, ErrorKind};
///
/// // Create a simple error
/// let err = SedimentError::new("index not found", ErrorKind::IndexNotFound);
///
/// // Create an error with a cause
/// let cause = SedimentError::new("IO failed", ErrorKind::IOError);
/// let err = SedimentError::new_with_cause("commit failed", ErrorKind::BackendError, cause);
/// ```
///
/// # Type alias
///
/// The `SedimentResult<T>` type alias is equivalent to `Result<T, SedimentError>`
/// and is used throughout the codebase for operations that can fail.
#[derive(Clone)]
pub struct SedimentError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<SedimentError>>,
    backtrace: Atomic<Backtrace>,
}

impl SedimentError {
    /// Creates a new `SedimentError` with the specified message and error kind.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    ///
    /// # Returns
    ///
    /// A new `SedimentError` instance.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        SedimentError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `SedimentError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for debugging.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    /// * `cause` - The underlying error that caused this error
    ///
    /// # Returns
    ///
    /// A new `SedimentError` instance with the cause error attached.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: SedimentError) -> Self {
        SedimentError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&Box<SedimentError>> {
        self.cause.as_ref()
    }
}

impl Display for SedimentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for SedimentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for SedimentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for sediment operations.
///
/// `SedimentResult<T>` is shorthand for `Result<T, SedimentError>`.
/// All fallible sediment operations return this type.
///
/// # Examples
///
/// ```rust,ignore
/// use sediment::errors::SedimentResult;
///
/// fn find_model(name: &str) -> SedimentResult<String> {
///     Ok(name.to_string())
/// }
/// ```
pub type SedimentResult<T> = Result<T, SedimentError>;

// From trait implementations for automatic error conversion
impl From<std::io::Error> for SedimentError {
    fn from(err: std::io::Error) -> Self {
        SedimentError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}
