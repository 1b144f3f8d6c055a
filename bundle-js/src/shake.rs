use crate::error::BundleResult;
use crate::link::export_names;
use crate::link::resolve_export;
use crate::link::resolve_import;
use crate::link::target;
use crate::link::Binding;
use crate::link::Target;
use crate::loader::Loader;
use crate::module::ImportedName;
use crate::module::Module;
use crate::module::ModuleId;
use crate::module::StatementId;
use crate::module::StatementKind;
use crate::module::DEFAULT_SLOT;
use crate::module::NAMESPACE_SLOT;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;
use std::sync::Arc;
use tracing::debug_span;
use tracing::trace;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StatementState {
  InProgress,
  Included,
}

/// Result of tree-shaking: what goes into the output.
pub struct Shaken {
  // In inclusion order; sort before emitting.
  pub included: Vec<(Arc<Module>, StatementId)>,
  // Modules whose namespace object is used, with the bindings behind each export name.
  pub namespaces: Vec<(Arc<Module>, Vec<(String, Binding)>)>,
  pub bindings: HashMap<(ModuleId, String), Binding>,
  // Requested exports of the entry module.
  pub exports: Vec<(String, Binding)>,
}

/// Walks from side effects and requested exports to every statement they need.
pub struct Shaker {
  loader: Loader,
  states: HashMap<(ModuleId, StatementId), StatementState>,
  included: Vec<(Arc<Module>, StatementId)>,
  namespace_modules: HashSet<ModuleId>,
  namespaces: Vec<(Arc<Module>, Vec<(String, Binding)>)>,
  side_effects_seeded: HashSet<ModuleId>,
  bindings: HashMap<(ModuleId, String), Binding>,
}

impl Shaker {
  pub fn new(loader: Loader) -> Shaker {
    Shaker {
      loader,
      states: HashMap::new(),
      included: Vec::new(),
      namespace_modules: HashSet::new(),
      namespaces: Vec::new(),
      side_effects_seeded: HashSet::new(),
      bindings: HashMap::new(),
    }
  }

  pub fn state(&self, module: ModuleId, statement: StatementId) -> Option<StatementState> {
    self.states.get(&(module, statement)).copied()
  }

  pub fn included(&self) -> &[(Arc<Module>, StatementId)] {
    &self.included
  }

  /// Includes a statement and everything it depends on. Calling it again is a no-op, including
  /// while the statement is still being expanded (a cycle).
  pub fn expand(&mut self, module: &Arc<Module>, statement: StatementId) -> BundleResult<()> {
    let key = (module.id, statement);
    if self.states.contains_key(&key) {
      return Ok(());
    };
    self.states.insert(key, StatementState::InProgress);
    let info = &module.statements[statement];
    for name in info.depends_on.iter() {
      self.define(module, name)?;
    }
    self.states.insert(key, StatementState::Included);
    trace!(module = %module.path.display(), statement, "included statement");
    self.included.push((module.clone(), statement));
    for name in info.defines.iter() {
      if let Some(modifiers) = module.modifications.get(name) {
        for &modifier in modifiers.iter() {
          self.expand(module, modifier)?;
        }
      };
    }
    Ok(())
  }

  // Includes whatever gives `name` its value in `module`. Unknown names are globals.
  fn define(&mut self, module: &Arc<Module>, name: &str) -> BundleResult<()> {
    if module.imports.contains_key(name) {
      let binding = self.import_binding(module, name)?;
      return self.include_binding(&binding);
    };
    match module.definitions.get(name) {
      Some(&statement) => self.expand(module, statement),
      None => Ok(()),
    }
  }

  fn import_binding(&mut self, module: &Arc<Module>, local: &str) -> BundleResult<Binding> {
    let key = (module.id, local.to_string());
    if let Some(binding) = self.bindings.get(&key) {
      return Ok(binding.clone());
    };
    let binding = resolve_import(&self.loader, module, local)?;
    // Re-export keys are not names anyone wrote, so they make poor suggestions.
    if let Some(import) = module.imports.get(local).filter(|_| !local.contains('#')) {
      let slot = match import.name {
        ImportedName::Default => Some(DEFAULT_SLOT),
        ImportedName::Namespace => Some(NAMESPACE_SLOT),
        ImportedName::Named(_) => None,
      };
      if let Some(slot) = slot {
        match target(&self.loader, module, &import.source)? {
          Target::Module(dep) => dep.suggest_name(slot, local),
          Target::External(external) => external.suggest_name(slot, local),
        };
      };
    };
    self.bindings.insert(key, binding.clone());
    Ok(binding)
  }

  fn include_binding(&mut self, binding: &Binding) -> BundleResult<()> {
    match binding {
      Binding::Local { module, local } => match module.definitions.get(local) {
        Some(&statement) => self.expand(module, statement),
        None => Ok(()),
      },
      Binding::Namespace { module } => self.include_namespace(module),
      Binding::External { .. } => Ok(()),
    }
  }

  // A namespace object needs every export of its module.
  fn include_namespace(&mut self, module: &Arc<Module>) -> BundleResult<()> {
    if !self.namespace_modules.insert(module.id) {
      return Ok(());
    };
    let slot = self.namespaces.len();
    self.namespaces.push((module.clone(), Vec::new()));
    for name in export_names(&self.loader, module)? {
      let binding = resolve_export(&self.loader, module, &name, &module.path)?;
      self.include_binding(&binding)?;
      self.namespaces[slot].1.push((name, binding));
    }
    Ok(())
  }

  /// Includes the statements of `module` that must run regardless of what is used, and those of
  /// the internal modules it imports only for effect.
  pub fn include_side_effects(&mut self, module: &Arc<Module>) -> BundleResult<()> {
    if !self.side_effects_seeded.insert(module.id) {
      return Ok(());
    };
    for (id, info) in module.statements.iter().enumerate() {
      match &info.kind {
        StatementKind::Import { source, bare: true } => {
          if let Target::Module(dep) = target(&self.loader, module, source)? {
            self.include_side_effects(&dep)?;
          };
        }
        StatementKind::Import { .. } | StatementKind::ExportList => {}
        _ if info.removable => {}
        _ => self.expand(module, id)?,
      };
    }
    Ok(())
  }

  /// Includes what backs the entry's export `name`.
  pub fn include_export(&mut self, entry: &Arc<Module>, name: &str) -> BundleResult<Binding> {
    let binding = resolve_export(&self.loader, entry, name, &entry.path)?;
    self.include_binding(&binding)?;
    Ok(binding)
  }

  pub fn finish(self) -> Shaken {
    Shaken {
      included: self.included,
      namespaces: self.namespaces,
      bindings: self.bindings,
      exports: Vec::new(),
    }
  }
}

/// Tree-shakes the graph rooted at `entry`. `requested` narrows the kept exports; None keeps all.
pub fn shake(loader: &Loader, entry: &Arc<Module>, requested: Option<&[String]>) -> BundleResult<Shaken> {
  let _span = debug_span!("bundle_js.expand", entry = %entry.path.display()).entered();
  let mut shaker = Shaker::new(loader.clone());
  shaker.include_side_effects(entry)?;
  let names = match requested {
    Some(names) => names.to_vec(),
    None => export_names(loader, entry)?,
  };
  let mut exports = Vec::with_capacity(names.len());
  for name in names {
    let binding = shaker.include_export(entry, &name)?;
    exports.push((name, binding));
  }
  let mut shaken = shaker.finish();
  shaken.exports = exports;
  Ok(shaken)
}

#[cfg(test)]
mod tests {
  use super::Shaker;
  use super::StatementState;
  use crate::loader::DefaultResolver;
  use crate::loader::Loader;
  use crate::loader::MemoryFiles;
  use std::path::Path;
  use std::sync::Arc;

  fn loader(files: &[(&str, &str)]) -> Loader {
    let mut memory = MemoryFiles::new();
    for (path, source) in files {
      memory.insert(path, *source);
    }
    Loader::new(Arc::new(memory), Arc::new(DefaultResolver))
  }

  #[test]
  fn expansion_is_idempotent() {
    let loader = loader(&[(
      "/main.js",
      "const a = 1;\nconst b = a + 1;\nfunction f() { return b; }\nconsole.log(f());",
    )]);
    let main = loader.load_graph(Path::new("/main.js")).unwrap();
    let mut shaker = Shaker::new(loader.clone());
    shaker.expand(&main, 3).unwrap();
    let first: Vec<_> = shaker.included().iter().map(|(_, id)| *id).collect();
    assert_eq!(first, vec![0, 1, 2, 3]);
    shaker.expand(&main, 3).unwrap();
    shaker.expand(&main, 1).unwrap();
    let second: Vec<_> = shaker.included().iter().map(|(_, id)| *id).collect();
    assert_eq!(first, second);
    assert_eq!(shaker.state(main.id, 0), Some(StatementState::Included));
  }

  #[test]
  fn cycles_terminate() {
    let loader = loader(&[(
      "/main.js",
      "function even(n) { return n == 0 || odd(n - 1); }\nfunction odd(n) { return n != 0 && even(n - 1); }\neven(4);",
    )]);
    let main = loader.load_graph(Path::new("/main.js")).unwrap();
    let mut shaker = Shaker::new(loader.clone());
    shaker.include_side_effects(&main).unwrap();
    let ids: Vec<_> = shaker.included().iter().map(|(_, id)| *id).collect();
    assert_eq!(ids, vec![1, 0, 2]);
  }

  #[test]
  fn modifiers_follow_their_target() {
    let loader = loader(&[(
      "/main.js",
      "export const config = {};\nfunction setup() { config.debug = true; }\nconst unused = {};\nfunction touch() { unused.x = 1; }",
    )]);
    let main = loader.load_graph(Path::new("/main.js")).unwrap();
    let shaken = super::shake(&loader, &main, Some(&["config".to_string()])).unwrap();
    let ids: Vec<_> = shaken.included.iter().map(|(_, id)| *id).collect();
    assert_eq!(ids, vec![0, 1]);
    assert_eq!(shaken.exports.len(), 1);
  }
}
