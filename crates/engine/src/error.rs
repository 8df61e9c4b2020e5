use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure attached to a single input item.
///
/// None of these abort a run: the engine funnels them into an [`ErrorCenter`]
/// and keeps counting the sibling items.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{name}: file or directory not found")]
    NotFound { name: String },

    #[error("{name}: file not found")]
    UrlNotFound { name: String },

    #[error("{name}: http error: {source}")]
    Http {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{name}: unexpected http status {status}")]
    HttpStatus {
        name: String,
        status: reqwest::StatusCode,
    },

    #[error("{name}: open error ({source})")]
    Open {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("{name}: read error ({source})")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("{name}: broken archive ({source})")]
    Decode {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{dest}: write error ({source})", dest = .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{name}: could not start counting task ({source})")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Result collector terminated unexpectedly")]
    Collector,
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// What one counting task reports: its records, or the reason it has none.
pub type Outcome = Result<Vec<crate::results::Record>>;

impl EngineError {
    /// Converts a read failure on `name`, unwrapping an engine error that a
    /// reader adapter smuggled through `io::Error` (e.g. a failed tee copy).
    pub(crate) fn read(name: &str, source: io::Error) -> Self {
        match source.downcast::<Self>() {
            Ok(inner) => inner,
            Err(source) => Self::Read {
                name: name.to_owned(),
                source,
            },
        }
    }

    pub(crate) fn decode<E>(name: &str, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Decode {
            name: name.to_owned(),
            source: source.into(),
        }
    }
}

/// Collects the per-item errors of a run.
///
/// Owned by the single consumer of the result channel, so pushes are
/// serialized without a lock.
#[derive(Debug, Default)]
pub struct ErrorCenter {
    errors: Vec<EngineError>,
}

impl ErrorCenter {
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: EngineError) {
        self.errors.push(error);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EngineError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<EngineError> {
        self.errors
    }
}

impl<'a> IntoIterator for &'a ErrorCenter {
    type Item = &'a EngineError;
    type IntoIter = std::slice::Iter<'a, EngineError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ErrorCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorCenter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_center_collects_in_push_order() {
        let mut center = ErrorCenter::new();
        assert!(center.is_empty());

        center.push(EngineError::NotFound {
            name: "missing.txt".into(),
        });
        center.push(EngineError::UrlNotFound {
            name: "https://example.com/none".into(),
        });

        assert_eq!(center.len(), 2);
        assert_eq!(
            center.to_string(),
            "missing.txt: file or directory not found\nhttps://example.com/none: file not found"
        );
    }

    #[test]
    fn test_read_unwraps_smuggled_engine_error() {
        let inner = EngineError::Write {
            path: PathBuf::from("copy.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let err = EngineError::read("https://example.com/copy.txt", io::Error::other(inner));
        assert!(matches!(err, EngineError::Write { .. }));

        let plain = EngineError::read("file.txt", io::Error::other("boom"));
        assert!(matches!(plain, EngineError::Read { ref name, .. } if name == "file.txt"));
    }
}
