use parse_js::error::SyntaxError;
use parse_js::loc::Location;
use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// A fatal bundling error. Any error aborts the whole build.
#[derive(Clone, Debug)]
pub enum BundleError {
  Parse {
    path: PathBuf,
    error: SyntaxError,
    location: Location,
  },
  DuplicateImport {
    path: PathBuf,
    name: String,
    location: Location,
  },
  IllegalReassignment {
    path: PathBuf,
    name: String,
    location: Location,
  },
  UnresolvedExport {
    path: PathBuf,
    name: String,
    location: Location,
  },
  // `path` is the module that was expected to export `name`.
  MissingExport {
    path: PathBuf,
    importer: PathBuf,
    name: String,
  },
  // Wrapped in an Arc so a failed load can be handed to every waiter of the same module.
  Io {
    path: PathBuf,
    error: Arc<io::Error>,
  },
}

impl BundleError {
  /// The module the error was raised for.
  pub fn path(&self) -> &PathBuf {
    match self {
      BundleError::Parse { path, .. }
      | BundleError::DuplicateImport { path, .. }
      | BundleError::IllegalReassignment { path, .. }
      | BundleError::UnresolvedExport { path, .. }
      | BundleError::MissingExport { path, .. }
      | BundleError::Io { path, .. } => path,
    }
  }
}

impl fmt::Display for BundleError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BundleError::Parse {
        path,
        error,
        location,
      } => write!(f, "{}:{location}: {error}", path.display()),
      BundleError::DuplicateImport {
        path,
        name,
        location,
      } => write!(
        f,
        "{}:{location}: duplicated import '{name}'",
        path.display()
      ),
      BundleError::IllegalReassignment {
        path,
        name,
        location,
      } => write!(
        f,
        "{}:{location}: illegal reassignment to import '{name}'",
        path.display()
      ),
      BundleError::UnresolvedExport {
        path,
        name,
        location,
      } => write!(
        f,
        "{}:{location}: export '{name}' is not defined",
        path.display()
      ),
      BundleError::MissingExport {
        path,
        importer,
        name,
      } => write!(
        f,
        "module {} does not export '{name}' (imported by {})",
        path.display(),
        importer.display()
      ),
      BundleError::Io { path, error } => {
        write!(f, "could not read {}: {error}", path.display())
      }
    }
  }
}

impl Error for BundleError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      BundleError::Parse { error, .. } => Some(error),
      BundleError::Io { error, .. } => Some(error.as_ref()),
      _ => None,
    }
  }
}

pub type BundleResult<T> = Result<T, BundleError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_includes_path_and_location() {
    let err = BundleError::IllegalReassignment {
      path: PathBuf::from("src/main.js"),
      name: "a".into(),
      location: Location { line: 3, column: 5 },
    };
    assert_eq!(
      err.to_string(),
      "src/main.js:3:5: illegal reassignment to import 'a'"
    );
  }

  #[test]
  fn io_errors_are_shareable() {
    let err = BundleError::Io {
      path: PathBuf::from("missing.js"),
      error: Arc::new(io::Error::new(io::ErrorKind::NotFound, "not found")),
    };
    let copy = err.clone();
    assert_eq!(copy.path(), &PathBuf::from("missing.js"));
    assert!(copy.source().is_some());
    assert_eq!(copy.to_string(), "could not read missing.js: not found");
  }
}
