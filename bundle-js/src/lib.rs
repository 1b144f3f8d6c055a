use ahash::HashMap;
use ahash::HashSet;
use ahash::HashSetExt;
use deconflict::deconflict;
use loader::with_js_extension;
use module::ModuleId;
use shake::shake;
use shake::Shaken;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub mod analyse;
mod deconflict;
pub mod error;
mod generate;
pub mod ident;
pub mod link;
pub mod loader;
pub mod module;
mod options;
mod plan;
pub mod scope;
pub mod shake;
pub mod side_effects;

pub use error::BundleError;
pub use error::BundleResult;
pub use generate::binding_name;
pub use generate::ExternalInfo;
pub use generate::Output;
pub use loader::DefaultResolver;
pub use loader::DiskFiles;
pub use loader::FileSource;
pub use loader::Loader;
pub use loader::MemoryFiles;
pub use loader::Resolver;
pub use module::Dependency;
pub use module::ExternalModule;
pub use module::Module;
pub use module::StatementId;
pub use options::BundleOptions;
pub use plan::BundlePlan;
pub use plan::PlannedModule;
pub use plan::PlannedRename;
pub use plan::PlannedStatement;

/// One build: the loaded graph, the statements kept, and their final names.
pub struct Bundle {
  loader: Loader,
  options: BundleOptions,
  entry: Arc<Module>,
  // Rank order: every module after the modules it imports, cycles aside.
  modules: Vec<Arc<Module>>,
  externals: Vec<Arc<ExternalModule>>,
  shaken: Shaken,
}

// Post-order depth-first walk of the import graph in source order.
fn visit(
  loader: &Loader,
  module: &Arc<Module>,
  visited: &mut HashSet<ModuleId>,
  modules: &mut Vec<Arc<Module>>,
  externals: &mut Vec<Arc<ExternalModule>>,
) -> BundleResult<()> {
  visited.insert(module.id);
  for (_, dependency) in module.dependencies.iter() {
    match dependency {
      Dependency::Internal(path) => {
        let dep = loader.load(path)?;
        if !visited.contains(&dep.id) {
          visit(loader, &dep, visited, modules, externals)?;
        };
      }
      Dependency::External(specifier) => {
        if !externals.iter().any(|e| &e.specifier == specifier) {
          externals.push(loader.external(specifier));
        };
      }
    };
  }
  modules.push(module.clone());
  Ok(())
}

impl Bundle {
  /// Loads the graph from `entry`, tree-shakes it, and names everything. Nothing is generated yet.
  pub fn build(entry: impl AsRef<Path>, options: BundleOptions) -> BundleResult<Bundle> {
    let mut path = options.files.entry_path(entry.as_ref());
    if !path.extension().is_some_and(|ext| ext == "js") {
      path = with_js_extension(path);
    };
    let loader = Loader::new(options.files.clone(), options.resolver.clone());
    let entry = loader.load_graph(&path)?;

    let mut modules = Vec::new();
    let mut externals = Vec::new();
    visit(
      &loader,
      &entry,
      &mut HashSet::new(),
      &mut modules,
      &mut externals,
    )?;
    let ranks: HashMap<ModuleId, usize> = modules
      .iter()
      .enumerate()
      .map(|(rank, module)| (module.id, rank))
      .collect();

    let mut shaken = shake(&loader, &entry, options.exports.as_deref())?;
    shaken
      .included
      .sort_by_key(|(module, id)| (ranks.get(&module.id).copied().unwrap_or(usize::MAX), *id));
    let namespaces: Vec<_> = shaken
      .namespaces
      .iter()
      .map(|(module, _)| module.clone())
      .collect();
    deconflict(&modules, &shaken.included, &namespaces, &externals);
    debug!(
      entry = %entry.path.display(),
      modules = modules.len(),
      statements = shaken.included.len(),
      externals = externals.len(),
      "built bundle"
    );

    Ok(Bundle {
      loader,
      options,
      entry,
      modules,
      externals,
      shaken,
    })
  }

  pub fn entry(&self) -> &Arc<Module> {
    &self.entry
  }

  pub fn modules(&self) -> &[Arc<Module>] {
    &self.modules
  }

  /// Included statements in output order.
  pub fn statements(&self) -> &[(Arc<Module>, StatementId)] {
    &self.shaken.included
  }

  pub fn externals(&self) -> &[Arc<ExternalModule>] {
    &self.externals
  }
}

/// Bundles the module at `entry` and everything it needs into one script.
///
/// # Examples
///
/// ```
/// use bundle_js::{bundle, BundleOptions, MemoryFiles};
///
/// let files = MemoryFiles::new()
///   .with_file("/main.js", "import { add } from './math';\nconsole.log(add(1, 2));")
///   .with_file(
///     "/math.js",
///     "export function add(a, b) { return a + b; }\nexport function sub(a, b) { return a - b; }",
///   );
/// let output = bundle("/main.js", BundleOptions::new().with_files(files)).unwrap();
/// assert_eq!(
///   output.code,
///   "function add(a, b) { return a + b; }\nconsole.log(add(1, 2));\n"
/// );
/// ```
pub fn bundle(entry: impl AsRef<Path>, options: BundleOptions) -> BundleResult<Output> {
  Bundle::build(entry, options)?.generate()
}
