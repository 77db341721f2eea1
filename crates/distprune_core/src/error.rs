use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions raised by the analysis engine.
///
/// Per-file parse failures are not errors: they are recorded as warnings and
/// only become [`Error::Parse`] when a scan runs in strict mode.
#[derive(Debug, Error)]
pub enum Error {
    #[error("dist directory not found: {}", .path.display())]
    DistNotFound { path: PathBuf },

    #[error("failed to parse {file}: {error}")]
    Parse { file: String, error: String },

    #[error("invalid package.json: {0}")]
    Manifest(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to start scan workers: {0}")]
    Workers(#[from] rayon::ThreadPoolBuildError),

    #[error(
        "dist imports packages from devDependencies: {}\nRemove them from devDependencies and keep them only in dependencies or peerDependencies, then retry.",
        .packages.join(", ")
    )]
    DevDependencyInDist { packages: Vec<String> },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dist_not_found_message() {
        let err = Error::DistNotFound { path: PathBuf::from("build/out") };
        assert_eq!(err.to_string(), "dist directory not found: build/out");
    }

    #[test]
    fn test_dev_dependency_message_lists_packages() {
        let err = Error::DevDependencyInDist { packages: vec!["vite".into(), "zod".into()] };
        let message = err.to_string();
        assert!(message.starts_with("dist imports packages from devDependencies: vite, zod"));
        assert!(message.contains("peerDependencies"));
    }
}
