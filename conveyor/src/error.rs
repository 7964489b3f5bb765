//! Error types and result definitions for conveyor operations.
//!
//! [`ConveyorError`] carries a classification, a static description, optional dynamic detail,
//! an optional source error, the callsite location and a backtrace. Failures of several workers
//! are aggregated into a single error so that the orchestrator can report all of them at once.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::panic::Location;
use std::sync::Arc;

use config::shared::ValidationError;

/// Convenient result type for conveyor operations using [`ConveyorError`] as the error type.
pub type ConveyorResult<T> = Result<T, ConveyorError>;

/// Detailed payload stored for single [`ConveyorError`] instances.
#[derive(Debug, Clone)]
struct ErrorPayload {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

/// Main error type for conveyor operations.
#[derive(Debug, Clone)]
pub struct ConveyorError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Single error payload holding rich metadata.
    Single(ErrorPayload),
    /// Multiple aggregated errors, mainly used to capture failures of several workers.
    Many {
        errors: Vec<ConveyorError>,
        location: &'static Location<'static>,
    },
}

/// Categories of errors that can occur while building or running a pipeline.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Setup errors
    ConfigError,

    // Stage errors
    StageClosed,
    InvalidState,

    // Worker errors
    WorkerPanic,
    WorkerCancelled,

    // Sink errors
    SinkError,

    // IO errors
    IoError,

    // Unknown / uncategorized
    Unknown,
}

impl ConveyorError {
    /// Returns the [`ErrorKind`] of this error.
    ///
    /// For multiple errors, returns the kind of the first error or [`ErrorKind::Unknown`]
    /// if the error list is empty.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.kind,
            ErrorRepr::Many { ref errors, .. } => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns all [`ErrorKind`]s present in this error, flattening aggregates.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::Single(ref payload) => vec![payload.kind],
            ErrorRepr::Many { ref errors, .. } => {
                errors.iter().flat_map(|err| err.kinds()).collect()
            }
        }
    }

    /// Returns the static description of this error.
    ///
    /// For multiple errors, returns the description of the first error.
    pub fn description(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::Single(ref payload) => Some(payload.description.as_ref()),
            ErrorRepr::Many { ref errors, .. } => errors.first().and_then(|e| e.description()),
        }
    }

    /// Returns the detailed error information if available.
    ///
    /// For multiple errors, returns the detail of the first error that has one.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.detail.as_deref(),
            ErrorRepr::Many { ref errors, .. } => errors.iter().find_map(|e| e.detail()),
        }
    }

    /// Returns the captured backtrace for single errors.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self.repr {
            ErrorRepr::Single(ref payload) => Some(payload.backtrace.as_ref()),
            ErrorRepr::Many { .. } => None,
        }
    }

    /// Returns the captured callsite location for this error.
    pub fn location(&self) -> &'static Location<'static> {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.location,
            ErrorRepr::Many { location, .. } => location,
        }
    }

    /// Attaches an originating error and returns the modified instance.
    ///
    /// Has no effect on aggregated errors, which forward their first error as source.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        if let ErrorRepr::Single(ref mut payload) = self.repr {
            payload.source = Some(Arc::new(source));
        }

        self
    }

    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        ConveyorError {
            repr: ErrorRepr::Single(ErrorPayload {
                kind,
                description,
                detail,
                source,
                location: Location::caller(),
                backtrace: Arc::new(Backtrace::capture()),
            }),
        }
    }
}

impl PartialEq for ConveyorError {
    fn eq(&self, other: &ConveyorError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::Single(a), ErrorRepr::Single(b)) => a.kind == b.kind,
            (ErrorRepr::Many { errors: a, .. }, ErrorRepr::Many { errors: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Hash for ConveyorError {
    /// Hashes only the kind and static description so that repeated occurrences group together.
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.repr).hash(state);
        match &self.repr {
            ErrorRepr::Single(payload) => {
                payload.kind.hash(state);
                payload.description.hash(state);
            }
            ErrorRepr::Many { errors, .. } => {
                errors.len().hash(state);
                for error in errors {
                    error.hash(state);
                }
            }
        }
    }
}

impl fmt::Display for ConveyorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            ErrorRepr::Single(payload) => {
                let location = payload.location;
                write!(
                    f,
                    "[{:?}] {} @ {}:{}:{}",
                    payload.kind,
                    payload.description,
                    location.file(),
                    location.line(),
                    location.column()
                )?;

                write_detail(payload.detail.as_deref(), f)?;
                write_backtrace(payload.backtrace.as_ref(), f)
            }
            ErrorRepr::Many { errors, location } => {
                let count = errors.len();
                write!(
                    f,
                    "[Many] {} error{} aggregated @ {}:{}:{}",
                    count,
                    if count == 1 { "" } else { "s" },
                    location.file(),
                    location.line(),
                    location.column()
                )?;

                for (index, error) in errors.iter().enumerate() {
                    let rendered = error.to_string();
                    let mut lines = rendered.lines();
                    write!(f, "\n  {}. {}", index + 1, lines.next().unwrap_or_default())?;
                    for line in lines {
                        write!(f, "\n     {line}")?;
                    }
                }

                Ok(())
            }
        }
    }
}

impl error::Error for ConveyorError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.repr {
            ErrorRepr::Single(payload) => payload
                .source
                .as_ref()
                .map(|source| &**source as &(dyn error::Error + 'static)),
            ErrorRepr::Many { errors, .. } => errors
                .first()
                .map(|error| error as &(dyn error::Error + 'static)),
        }
    }
}

fn write_detail(detail: Option<&str>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let Some(detail) = detail else {
        return Ok(());
    };

    if detail.trim().is_empty() {
        return write!(f, "\n  Detail: <empty>");
    }

    write!(f, "\n  Detail:")?;
    for line in detail.lines() {
        write!(f, "\n    {line}")?;
    }

    Ok(())
}

fn write_backtrace(backtrace: &Backtrace, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let rendered = backtrace.to_string();
    if rendered.trim().is_empty() {
        return Ok(());
    }

    write!(f, "\n  Backtrace:")?;
    for line in rendered.lines() {
        write!(f, "\n    {line}")?;
    }

    Ok(())
}

/// Creates a [`ConveyorError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for ConveyorError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> ConveyorError {
        ConveyorError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates a [`ConveyorError`] from an error kind, static description and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for ConveyorError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> ConveyorError {
        ConveyorError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Aggregates errors; a single error is returned as is instead of being wrapped.
impl<E> From<Vec<E>> for ConveyorError
where
    E: Into<ConveyorError>,
{
    #[track_caller]
    fn from(errors: Vec<E>) -> ConveyorError {
        let location = Location::caller();
        let errors: Vec<ConveyorError> = errors.into_iter().map(Into::into).collect();

        let errors = match <[ConveyorError; 1]>::try_from(errors) {
            Ok([error]) => return error,
            Err(errors) => errors,
        };

        ConveyorError {
            repr: ErrorRepr::Many { errors, location },
        }
    }
}

/// Converts [`std::io::Error`] to [`ConveyorError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for ConveyorError {
    #[track_caller]
    fn from(err: std::io::Error) -> ConveyorError {
        let detail = err.to_string();
        ConveyorError::from_components(
            ErrorKind::IoError,
            Cow::Borrowed("I/O operation failed"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

/// Converts a configuration [`ValidationError`] to [`ConveyorError`] with [`ErrorKind::ConfigError`].
impl From<ValidationError> for ConveyorError {
    #[track_caller]
    fn from(err: ValidationError) -> ConveyorError {
        let detail = err.to_string();
        ConveyorError::from_components(
            ErrorKind::ConfigError,
            Cow::Borrowed("Invalid pipeline configuration"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}
