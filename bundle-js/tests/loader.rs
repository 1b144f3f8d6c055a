use bundle_js::DefaultResolver;
use bundle_js::FileSource;
use bundle_js::Loader;
use bundle_js::MemoryFiles;
use common::files;
use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator;
use std::io;
use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

mod common;

// Counts reads and makes each one slow enough for loads to overlap.
struct SlowFiles {
  inner: MemoryFiles,
  reads: Arc<AtomicUsize>,
}

impl FileSource for SlowFiles {
  fn read(&self, path: &Path) -> io::Result<String> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    sleep(Duration::from_millis(20));
    self.inner.read(path)
  }
}

fn slow_loader(modules: &[(&str, &str)]) -> (Loader, Arc<AtomicUsize>) {
  let reads = Arc::new(AtomicUsize::new(0));
  let files = SlowFiles {
    inner: files(modules),
    reads: reads.clone(),
  };
  (
    Loader::new(Arc::new(files), Arc::new(DefaultResolver)),
    reads,
  )
}

#[test]
fn concurrent_loads_share_one_module() {
  let (loader, reads) = slow_loader(&[("/shared.js", "export const shared = 1;")]);
  let loaded: Vec<_> = (0..16)
    .into_par_iter()
    .map(|_| loader.load(Path::new("/shared.js")).unwrap())
    .collect();
  assert_eq!(reads.load(Ordering::SeqCst), 1);
  assert_eq!(loader.module_count(), 1);
  assert!(loaded.iter().all(|m| Arc::ptr_eq(m, &loaded[0])));
}

#[test]
fn diamond_graphs_load_each_module_once() {
  let mut modules = vec![(
    "/main.js".to_string(),
    (0..8)
      .map(|i| format!("import {{ v{i} }} from './dep{i}';\n"))
      .collect::<String>(),
  )];
  for i in 0..8 {
    modules.push((
      format!("/dep{i}.js"),
      format!("import {{ shared }} from './shared';\nexport const v{i} = shared + {i};"),
    ));
  }
  modules.push((
    "/shared.js".to_string(),
    "export const shared = 1;".to_string(),
  ));
  let borrowed: Vec<(&str, &str)> = modules
    .iter()
    .map(|(path, source)| (path.as_str(), source.as_str()))
    .collect();
  let (loader, reads) = slow_loader(&borrowed);
  loader.load_graph(Path::new("/main.js")).unwrap();
  assert_eq!(loader.module_count(), 10);
  assert_eq!(reads.load(Ordering::SeqCst), 10);
  let shared = loader.load(Path::new("/shared.js")).unwrap();
  let dep = loader.load(Path::new("/dep3.js")).unwrap();
  assert_ne!(shared.id, dep.id);
  assert_eq!(reads.load(Ordering::SeqCst), 10);
}

#[test]
fn externals_are_shared_by_specifier() {
  let (loader, _) = slow_loader(&[]);
  let a = loader.external("lodash");
  let b = loader.external("lodash");
  assert!(Arc::ptr_eq(&a, &b));
  assert_eq!(a.name(), "lodash");
}
