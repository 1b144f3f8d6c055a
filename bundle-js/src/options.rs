use crate::loader::DefaultResolver;
use crate::loader::DiskFiles;
use crate::loader::FileSource;
use crate::loader::Resolver;
use std::sync::Arc;

#[derive(Clone)]
pub struct BundleOptions {
  pub resolver: Arc<dyn Resolver>,
  pub files: Arc<dyn FileSource>,
  // None keeps every export of the entry module.
  pub exports: Option<Vec<String>>,
  pub comments: bool,
  pub margins: bool,
}

impl BundleOptions {
  pub fn new() -> BundleOptions {
    BundleOptions {
      resolver: Arc::new(DefaultResolver),
      files: Arc::new(DiskFiles),
      exports: None,
      comments: true,
      margins: false,
    }
  }

  pub fn with_resolver(self, resolver: impl Resolver) -> BundleOptions {
    BundleOptions {
      resolver: Arc::new(resolver),
      ..self
    }
  }

  pub fn with_files(self, files: impl FileSource) -> BundleOptions {
    BundleOptions {
      files: Arc::new(files),
      ..self
    }
  }

  /// Only keep these exports of the entry module (and what they need).
  pub fn with_exports<S: Into<String>>(self, exports: impl IntoIterator<Item = S>) -> BundleOptions {
    BundleOptions {
      exports: Some(exports.into_iter().map(Into::into).collect()),
      ..self
    }
  }

  /// Reproduce comments attached to included statements.
  pub fn with_comments(self, comments: bool) -> BundleOptions {
    BundleOptions { comments, ..self }
  }

  /// Reproduce blank lines between statements of the same module.
  pub fn with_margins(self, margins: bool) -> BundleOptions {
    BundleOptions { margins, ..self }
  }
}

impl Default for BundleOptions {
  fn default() -> Self {
    Self::new()
  }
}
