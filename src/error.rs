use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TocError {
    #[error("{}: not found{}", .path.display(), did_you_mean(.suggestion.as_deref()))]
    NotFound {
        path: PathBuf,
        suggestion: Option<String>,
    },

    #[error("{}: permission denied", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("file watcher: {0}")]
    Watch(#[from] notify::Error),

    #[error("{0}")]
    InvalidArgs(String),
}

impl TocError {
    /// Classify an I/O error against the path it happened on.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => TocError::NotFound {
                path,
                suggestion: None,
            },
            std::io::ErrorKind::PermissionDenied => TocError::PermissionDenied { path },
            _ => TocError::Io { path, source },
        }
    }
}

fn did_you_mean(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean {name}?)"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_mentions_suggestion() {
        let err = TocError::NotFound {
            path: PathBuf::from("notes/todo.md"),
            suggestion: Some("todos.md".into()),
        };
        assert_eq!(err.to_string(), "notes/todo.md: not found (did you mean todos.md?)");
    }

    #[test]
    fn io_kinds_are_classified() {
        let e = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(
            TocError::from_io("x.md", e),
            TocError::PermissionDenied { .. }
        ));
        let e = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(matches!(TocError::from_io("x.md", e), TocError::NotFound { .. }));
    }
}
