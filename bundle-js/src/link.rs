use crate::error::BundleError;
use crate::error::BundleResult;
use crate::loader::Loader;
use crate::module::Dependency;
use crate::module::ExternalModule;
use crate::module::ImportedName;
use crate::module::Module;
use crate::module::ModuleId;
use crate::module::DEFAULT_SLOT;
use ahash::HashSet;
use ahash::HashSetExt;
use std::path::Path;
use std::sync::Arc;

/// What an imported or exported name finally refers to.
#[derive(Clone, Debug)]
pub enum Binding {
  // A top-level binding (or the default slot) of a bundled module.
  Local {
    module: Arc<Module>,
    local: String,
  },
  // The namespace object of a bundled module.
  Namespace {
    module: Arc<Module>,
  },
  External {
    external: Arc<ExternalModule>,
    name: ImportedName,
  },
}

pub enum Target {
  Module(Arc<Module>),
  External(Arc<ExternalModule>),
}

/// The module an import source of `module` refers to.
pub fn target(loader: &Loader, module: &Module, source: &str) -> BundleResult<Target> {
  let dependency = match module.dependency(source) {
    Some(dependency) => dependency.clone(),
    None => match loader.resolve(source, Some(&module.path)) {
      Some(path) => Dependency::Internal(path),
      None => Dependency::External(source.to_string()),
    },
  };
  Ok(match dependency {
    Dependency::Internal(path) => Target::Module(loader.load(&path)?),
    Dependency::External(specifier) => Target::External(loader.external(&specifier)),
  })
}

type Visited = HashSet<(ModuleId, String)>;

fn resolve_import_inner(
  loader: &Loader,
  module: &Arc<Module>,
  local: &str,
  visited: &mut Visited,
) -> BundleResult<Binding> {
  let Some(import) = module.imports.get(local) else {
    return Ok(Binding::Local {
      module: module.clone(),
      local: local.to_string(),
    });
  };
  match (target(loader, module, &import.source)?, import.name.export_name()) {
    (Target::External(external), _) => Ok(Binding::External {
      external,
      name: import.name.clone(),
    }),
    (Target::Module(dep), None) => Ok(Binding::Namespace { module: dep }),
    (Target::Module(dep), Some(name)) => {
      resolve_export_inner(loader, &dep, name, &module.path, visited)
    }
  }
}

fn resolve_export_inner(
  loader: &Loader,
  module: &Arc<Module>,
  name: &str,
  importer: &Path,
  visited: &mut Visited,
) -> BundleResult<Binding> {
  let missing = || BundleError::MissingExport {
    path: module.path.clone(),
    importer: importer.to_path_buf(),
    name: name.to_string(),
  };
  // A re-export cycle never reaches a definition.
  if !visited.insert((module.id, name.to_string())) {
    return Err(missing());
  };
  if let Some(export) = module.exports.get(name) {
    return resolve_import_inner(loader, module, &export.local, visited);
  };
  // `export *` never forwards the default export.
  if name == DEFAULT_SLOT {
    return Err(missing());
  };
  let mut external_star = None;
  for source in module.star_exports.iter() {
    match target(loader, module, source)? {
      Target::Module(dep) => match resolve_export_inner(loader, &dep, name, &module.path, visited) {
        Ok(binding) => return Ok(binding),
        Err(BundleError::MissingExport { .. }) => {}
        Err(err) => return Err(err),
      },
      Target::External(external) => {
        external_star.get_or_insert(external);
      }
    };
  }
  match external_star {
    Some(external) => Ok(Binding::External {
      external,
      name: ImportedName::Named(name.to_string()),
    }),
    None => Err(missing()),
  }
}

/// Follows an import of `module` through re-exports to its definition.
pub fn resolve_import(loader: &Loader, module: &Arc<Module>, local: &str) -> BundleResult<Binding> {
  resolve_import_inner(loader, module, local, &mut Visited::new())
}

/// Finds what `module` exports as `name`, as requested by `importer`.
pub fn resolve_export(
  loader: &Loader,
  module: &Arc<Module>,
  name: &str,
  importer: &Path,
) -> BundleResult<Binding> {
  resolve_export_inner(loader, module, name, importer, &mut Visited::new())
}

fn collect_export_names(
  loader: &Loader,
  module: &Arc<Module>,
  include_default: bool,
  names: &mut Vec<String>,
  seen: &mut HashSet<String>,
  visited: &mut HashSet<ModuleId>,
) -> BundleResult<()> {
  if !visited.insert(module.id) {
    return Ok(());
  };
  for name in module.export_order.iter() {
    if (include_default || name != DEFAULT_SLOT) && seen.insert(name.clone()) {
      names.push(name.clone());
    };
  }
  for source in module.star_exports.iter() {
    // Names behind an external `export *` are unknown.
    if let Target::Module(dep) = target(loader, module, source)? {
      collect_export_names(loader, &dep, false, names, seen, visited)?;
    };
  }
  Ok(())
}

/// Every name `module` exports, own exports first, then star re-exports in order.
pub fn export_names(loader: &Loader, module: &Arc<Module>) -> BundleResult<Vec<String>> {
  let mut names = Vec::new();
  collect_export_names(
    loader,
    module,
    true,
    &mut names,
    &mut HashSet::new(),
    &mut HashSet::new(),
  )?;
  Ok(names)
}
