//! Error types and result definitions for harmonization runs.
//!
//! Only failures that abort a run are represented here. Per-record problems such as a
//! malformed document or a value that cannot be cast are counted in the run statistics
//! and never surface as a [`HarmonizerError`].

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use harmonizer_config::shared::ValidationError;

/// Result type used by every fallible harmonizer operation.
pub type HarmonizerResult<T> = Result<T, HarmonizerError>;

/// Main error type of the harmonizer.
///
/// Carries an [`ErrorKind`], a static description, optional dynamic detail and the source
/// error, plus the call site and backtrace captured where it was created.
#[derive(Debug, Clone)]
pub struct HarmonizerError {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

/// Categories of run-aborting failures.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Source errors
    SourceUnavailable,
    SourceSchemaError,

    // Data errors
    InvalidData,

    // Configuration errors
    ConfigError,

    // IO & serialization errors
    IoError,
    SerializationError,
    DeserializationError,

    // Workflow errors
    InvalidState,
    WorkerPanic,
}

impl HarmonizerError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the static description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the dynamic detail, usually the path or value that caused the failure.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Attaches the originating error, exposed through [`error::Error::source`].
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        HarmonizerError {
            kind,
            description,
            detail,
            source,
            location: Location::caller(),
            backtrace: Arc::new(Backtrace::capture()),
        }
    }

    #[track_caller]
    fn wrap<E>(kind: ErrorKind, description: &'static str, err: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        let detail = err.to_string();
        HarmonizerError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

impl fmt::Display for HarmonizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}] {} @ {}:{}:{}",
            self.kind,
            self.description,
            self.location.file(),
            self.location.line(),
            self.location.column()
        )?;

        write_detail(self.detail.as_deref(), f)?;
        write_backtrace(self.backtrace.as_ref(), f)
    }
}

impl error::Error for HarmonizerError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn error::Error + 'static))
    }
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

impl From<(ErrorKind, &'static str)> for HarmonizerError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> HarmonizerError {
        HarmonizerError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

impl<D> From<(ErrorKind, &'static str, D)> for HarmonizerError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> HarmonizerError {
        HarmonizerError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

impl From<std::io::Error> for HarmonizerError {
    #[track_caller]
    fn from(err: std::io::Error) -> HarmonizerError {
        HarmonizerError::wrap(ErrorKind::IoError, "I/O operation failed", err)
    }
}

/// Maps syntax and data errors to [`ErrorKind::DeserializationError`].
impl From<serde_json::Error> for HarmonizerError {
    #[track_caller]
    fn from(err: serde_json::Error) -> HarmonizerError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (ErrorKind::IoError, "JSON I/O operation failed"),
            serde_json::error::Category::Syntax
            | serde_json::error::Category::Data
            | serde_json::error::Category::Eof => (
                ErrorKind::DeserializationError,
                "JSON deserialization failed",
            ),
        };

        HarmonizerError::wrap(kind, description, err)
    }
}

/// Reader-level I/O failures map to [`ErrorKind::IoError`], everything else to
/// [`ErrorKind::DeserializationError`].
impl From<csv::Error> for HarmonizerError {
    #[track_caller]
    fn from(err: csv::Error) -> HarmonizerError {
        let (kind, description) = match err.kind() {
            csv::ErrorKind::Io(_) => (ErrorKind::IoError, "CSV I/O operation failed"),
            _ => (ErrorKind::DeserializationError, "CSV decoding failed"),
        };

        HarmonizerError::wrap(kind, description, err)
    }
}

impl From<arrow::error::ArrowError> for HarmonizerError {
    #[track_caller]
    fn from(err: arrow::error::ArrowError) -> HarmonizerError {
        HarmonizerError::wrap(
            ErrorKind::SerializationError,
            "Arrow record batch construction failed",
            err,
        )
    }
}

impl From<parquet::errors::ParquetError> for HarmonizerError {
    #[track_caller]
    fn from(err: parquet::errors::ParquetError) -> HarmonizerError {
        HarmonizerError::wrap(ErrorKind::SerializationError, "Parquet write failed", err)
    }
}

/// A background task that panicked maps to [`ErrorKind::WorkerPanic`].
impl From<tokio::task::JoinError> for HarmonizerError {
    #[track_caller]
    fn from(err: tokio::task::JoinError) -> HarmonizerError {
        HarmonizerError::wrap(ErrorKind::WorkerPanic, "Background task failed", err)
    }
}

impl From<ValidationError> for HarmonizerError {
    #[track_caller]
    fn from(err: ValidationError) -> HarmonizerError {
        HarmonizerError::wrap(ErrorKind::ConfigError, "Invalid configuration", err)
    }
}
