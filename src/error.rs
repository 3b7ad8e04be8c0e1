use std::fmt;
use std::path::PathBuf;

/// Main error type for npmrc-switch operations
#[derive(Debug)]
pub enum SwitchError {
    Io {
        source: std::io::Error,
        context: String,
    },
    Config {
        message: String,
        path: Option<PathBuf>,
    },
    InvalidName {
        name: String,
        reason: String,
    },
    EmptyContent {
        name: String,
    },
    NotFound {
        resource: String,
        identifier: String,
    },
    LockTimeout {
        path: PathBuf,
        attempts: u32,
    },
    PartialFailure {
        operation: String,
        failed: usize,
    },
}

impl SwitchError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        1
    }

    pub(crate) fn not_found(resource: &str, identifier: impl Into<String>) -> Self {
        SwitchError::NotFound {
            resource: resource.to_string(),
            identifier: identifier.into(),
        }
    }

    pub(crate) fn invalid_name(name: &str, reason: &str) -> Self {
        SwitchError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for SwitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchError::Io { source, context } => {
                write!(f, "IO error during {}: {}", context, source)
            }
            SwitchError::Config { message, path } => {
                if let Some(path) = path {
                    write!(f, "Configuration error in {}: {}", path.display(), message)
                } else {
                    write!(f, "Configuration error: {}", message)
                }
            }
            SwitchError::InvalidName { name, reason } => {
                if name.is_empty() {
                    write!(f, "Invalid name: {}", reason)
                } else {
                    write!(f, "Invalid name '{}': {}", name, reason)
                }
            }
            SwitchError::EmptyContent { name } => {
                write!(
                    f,
                    "Can't save an empty configuration as '{}', use 'clear' instead",
                    name
                )
            }
            SwitchError::NotFound { resource, identifier } => {
                write!(f, "Could not find the {} '{}'", resource, identifier)
            }
            SwitchError::LockTimeout { path, attempts } => {
                write!(
                    f,
                    "Could not get lockfile after {} attempts. Check \"{}\" and empty it if nothing else is running",
                    attempts,
                    path.display()
                )
            }
            SwitchError::PartialFailure { operation, failed } => {
                write!(f, "{} finished with {} failed item(s)", operation, failed)
            }
        }
    }
}

impl std::error::Error for SwitchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SwitchError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SwitchError>;

pub trait ErrorContext<T> {
    fn with_io_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::result::Result<T, std::io::Error> {
    fn with_io_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| SwitchError::Io {
            source: e,
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_context_keeps_source() {
        let res: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"));
        let err = res.with_io_context(|| "writing /tmp/x".to_string()).unwrap_err();
        assert!(err.to_string().contains("writing /tmp/x"));
        assert!(err.source().is_some());
    }

    #[test]
    fn every_error_exits_with_one() {
        let errors = [
            SwitchError::invalid_name("all", "reserved"),
            SwitchError::EmptyContent { name: "work".into() },
            SwitchError::not_found("configuration", "work"),
            SwitchError::LockTimeout { path: PathBuf::from("/x/switch-lock"), attempts: 20 },
        ];
        for err in &errors {
            assert_eq!(err.exit_code(), 1);
        }
    }

    #[test]
    fn timeout_message_points_at_token() {
        let err = SwitchError::LockTimeout {
            path: PathBuf::from("/tmp/store/switch-lock"),
            attempts: 20,
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/store/switch-lock"));
        assert!(msg.contains("empty it"));
    }
}
