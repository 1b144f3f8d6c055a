use crate::analyse::analyse;
use crate::error::BundleError;
use crate::error::BundleResult;
use crate::module::Dependency;
use crate::module::ExternalModule;
use crate::module::Module;
use crate::module::ModuleId;
use ahash::HashMap;
use ahash::HashMapExt;
use dashmap::DashMap;
use dashmap::DashSet;
use once_cell::sync::OnceCell;
use parse_js::loc::Location;
use parse_js::parse;
use rayon::iter::IntoParallelRefIterator;
use rayon::iter::ParallelIterator;
use std::ffi::OsString;
use std::io;
use std::ops::Deref;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::debug;
use tracing::debug_span;

/// Where module source text comes from.
pub trait FileSource: Send + Sync + 'static {
  fn read(&self, path: &Path) -> io::Result<String>;

  /// Normalises the entry path before it is loaded.
  fn entry_path(&self, path: &Path) -> PathBuf {
    normalize_path(path)
  }
}

/// Reads modules from the file system.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskFiles;

impl FileSource for DiskFiles {
  fn read(&self, path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
  }

  fn entry_path(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      return normalize_path(path);
    };
    match std::env::current_dir() {
      Ok(cwd) => normalize_path(&cwd.join(path)),
      Err(_) => normalize_path(path),
    }
  }
}

/// In-memory modules keyed by (normalised) path.
#[derive(Clone, Debug, Default)]
pub struct MemoryFiles {
  files: HashMap<PathBuf, Arc<str>>,
}

impl MemoryFiles {
  pub fn new() -> MemoryFiles {
    MemoryFiles {
      files: HashMap::new(),
    }
  }

  pub fn insert(&mut self, path: impl AsRef<Path>, source: impl Into<Arc<str>>) {
    self
      .files
      .insert(normalize_path(path.as_ref()), source.into());
  }

  pub fn with_file(mut self, path: impl AsRef<Path>, source: impl Into<Arc<str>>) -> MemoryFiles {
    self.insert(path, source);
    self
  }
}

impl FileSource for MemoryFiles {
  fn read(&self, path: &Path) -> io::Result<String> {
    self
      .files
      .get(&normalize_path(path))
      .map(|source| source.to_string())
      .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
  }
}

/// Maps an import specifier to a module path, or None for an external module.
pub trait Resolver: Send + Sync + 'static {
  fn resolve(&self, specifier: &str, importer: Option<&Path>) -> Option<PathBuf>;
}

impl<F> Resolver for F
where
  F: Fn(&str, Option<&Path>) -> Option<PathBuf> + Send + Sync + 'static,
{
  fn resolve(&self, specifier: &str, importer: Option<&Path>) -> Option<PathBuf> {
    self(specifier, importer)
  }
}

/// Relative specifiers resolve against the importer's directory with `.js` appended. Bare
/// specifiers are external.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultResolver;

impl Resolver for DefaultResolver {
  fn resolve(&self, specifier: &str, importer: Option<&Path>) -> Option<PathBuf> {
    let path = Path::new(specifier);
    if path.is_absolute() {
      return Some(path.to_path_buf());
    };
    let Some(importer) = importer else {
      return Some(path.to_path_buf());
    };
    if !specifier.starts_with('.') {
      return None;
    };
    let dir = importer.parent().unwrap_or(Path::new(""));
    let resolved = normalize_path(&dir.join(path));
    Some(if specifier.ends_with(".js") {
      resolved
    } else {
      with_js_extension(resolved)
    })
  }
}

pub fn with_js_extension(path: PathBuf) -> PathBuf {
  let mut raw = OsString::from(path);
  raw.push(".js");
  PathBuf::from(raw)
}

/// Resolves `.` and `..` components without touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        let can_pop = matches!(out.components().next_back(), Some(Component::Normal(_)));
        if can_pop {
          out.pop();
        } else if !matches!(
          out.components().next_back(),
          Some(Component::RootDir | Component::Prefix(_))
        ) {
          out.push("..");
        };
      }
      other => out.push(other.as_os_str()),
    };
  }
  out
}

type ModuleCell = Arc<OnceCell<BundleResult<Arc<Module>>>>;

pub struct LoaderInner {
  pub files: Arc<dyn FileSource>,
  pub resolver: Arc<dyn Resolver>,
  // One cell per path; every caller for the same path waits on the same cell.
  modules: DashMap<PathBuf, ModuleCell>,
  externals: DashMap<String, Arc<ExternalModule>>,
  prefetched: DashSet<PathBuf>,
  next_module_id: AtomicUsize,
}

/// Loads, parses, and analyses modules, each at most once.
#[derive(Clone)]
pub struct Loader(Arc<LoaderInner>);

impl Deref for Loader {
  type Target = LoaderInner;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl Loader {
  pub fn new(files: Arc<dyn FileSource>, resolver: Arc<dyn Resolver>) -> Loader {
    Loader(Arc::new(LoaderInner {
      files,
      resolver,
      modules: DashMap::new(),
      externals: DashMap::new(),
      prefetched: DashSet::new(),
      next_module_id: AtomicUsize::new(0),
    }))
  }

  pub fn resolve(&self, specifier: &str, importer: Option<&Path>) -> Option<PathBuf> {
    match importer {
      None => Some(PathBuf::from(specifier)),
      Some(importer) => self.resolver.resolve(specifier, Some(importer)),
    }
  }

  /// Returns the module at `path`, loading it if no other caller has.
  pub fn load(&self, path: &Path) -> BundleResult<Arc<Module>> {
    // The map guard must be released before waiting on the cell.
    let cell = self
      .modules
      .entry(path.to_path_buf())
      .or_insert_with(|| Arc::new(OnceCell::new()))
      .clone();
    cell
      .get_or_init(|| self.read_module(path).map(Arc::new))
      .clone()
  }

  /// Loads `path` and everything it imports, fanning out across threads.
  pub fn load_graph(&self, path: &Path) -> BundleResult<Arc<Module>> {
    let module = self.load(path)?;
    self.prefetch(&module)?;
    Ok(module)
  }

  fn prefetch(&self, module: &Arc<Module>) -> BundleResult<()> {
    if !self.prefetched.insert(module.path.clone()) {
      return Ok(());
    };
    module
      .dependencies
      .par_iter()
      .try_for_each(|(_, dependency)| match dependency {
        Dependency::Internal(path) => {
          let dep = self.load(path)?;
          self.prefetch(&dep)
        }
        Dependency::External(_) => Ok(()),
      })
  }

  pub fn external(&self, specifier: &str) -> Arc<ExternalModule> {
    self
      .externals
      .entry(specifier.to_string())
      .or_insert_with(|| Arc::new(ExternalModule::new(specifier.to_string())))
      .clone()
  }

  /// Number of distinct module paths requested so far.
  pub fn module_count(&self) -> usize {
    self.modules.len()
  }

  fn read_module(&self, path: &Path) -> BundleResult<Module> {
    let _span = debug_span!("bundle_js.load", path = %path.display()).entered();
    let source = self.files.read(path).map_err(|error| BundleError::Io {
      path: path.to_path_buf(),
      error: Arc::new(error),
    })?;
    let ast = parse(&source).map_err(|error| BundleError::Parse {
      path: path.to_path_buf(),
      location: Location::from_offset(&source, error.loc.0),
      error,
    })?;
    let analysis = analyse(path, &source, &ast)?;
    let dependencies = analysis
      .sources
      .iter()
      .map(|specifier| {
        let dependency = match self.resolve(specifier, Some(path)) {
          Some(resolved) => Dependency::Internal(resolved),
          None => Dependency::External(specifier.clone()),
        };
        (specifier.clone(), dependency)
      })
      .collect();
    let id = ModuleId(self.next_module_id.fetch_add(1, Ordering::Relaxed));
    debug!(
      path = %path.display(),
      id = id.0,
      statements = analysis.statements.len(),
      "loaded module"
    );
    Ok(Module::new(
      id,
      path.to_path_buf(),
      source,
      ast,
      analysis,
      dependencies,
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalizes_lexically() {
    assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
    assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
    assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
    assert_eq!(normalize_path(Path::new("./a.js")), PathBuf::from("a.js"));
  }

  #[test]
  fn default_resolver() {
    let r = DefaultResolver;
    let importer = Path::new("/src/app/main.js");
    assert_eq!(
      r.resolve("./util", Some(importer)),
      Some(PathBuf::from("/src/app/util.js"))
    );
    assert_eq!(
      r.resolve("../lib/x.js", Some(importer)),
      Some(PathBuf::from("/src/lib/x.js"))
    );
    assert_eq!(
      r.resolve("/abs/mod", Some(importer)),
      Some(PathBuf::from("/abs/mod"))
    );
    assert_eq!(r.resolve("lodash", Some(importer)), None);
  }

  #[test]
  fn closures_are_resolvers() {
    let files = MemoryFiles::new().with_file("/main.js", "import x from 'virtual';");
    let resolver = |specifier: &str, _: Option<&Path>| {
      (specifier == "virtual").then(|| PathBuf::from("/virtual.js"))
    };
    let loader = Loader::new(Arc::new(files), Arc::new(resolver));
    let main = loader.load(Path::new("/main.js")).unwrap();
    assert_eq!(main.dependencies, vec![(
      "virtual".to_string(),
      Dependency::Internal(PathBuf::from("/virtual.js"))
    )]);
    assert_eq!(loader.resolve("anything", None), Some(PathBuf::from("anything")));
  }

  #[test]
  fn failures_are_cached() {
    let loader = Loader::new(Arc::new(MemoryFiles::new()), Arc::new(DefaultResolver));
    let first = loader.load(Path::new("/missing.js")).unwrap_err();
    let second = loader.load(Path::new("/missing.js")).unwrap_err();
    assert!(matches!(first, BundleError::Io { .. }));
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(loader.module_count(), 1);
  }

  #[test]
  fn parse_errors_carry_location() {
    let files = MemoryFiles::new().with_file("/bad.js", "const a = 1;\nconst = ;");
    let loader = Loader::new(Arc::new(files), Arc::new(DefaultResolver));
    match loader.load(Path::new("/bad.js")) {
      Err(BundleError::Parse { location, .. }) => assert_eq!(location.line, 2),
      other => panic!("expected parse error, got {other:?}"),
    }
  }
}
