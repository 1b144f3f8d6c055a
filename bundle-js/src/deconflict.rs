use crate::module::ExternalModule;
use crate::module::Module;
use crate::module::StatementId;
use crate::module::DEFAULT_SLOT;
use crate::module::NAMESPACE_SLOT;
use ahash::HashMap;
use ahash::HashSet;
use ahash::HashSetExt;
use std::sync::Arc;
use tracing::debug;
use tracing::debug_span;

// Something in the output that wants a top-level name.
enum Occupant {
  Local { module: Arc<Module>, local: String },
  External(Arc<ExternalModule>),
  // A name read but never defined; it cannot be renamed.
  Global,
}

impl Occupant {
  fn is(&self, other: &Occupant) -> bool {
    match (self, other) {
      (Occupant::Local { module: a, local: x }, Occupant::Local { module: b, local: y }) => {
        a.id == b.id && x == y
      }
      (Occupant::External(a), Occupant::External(b)) => Arc::ptr_eq(a, b),
      (Occupant::Global, Occupant::Global) => true,
      _ => false,
    }
  }

  fn rename(&self, replacement: String) {
    match self {
      Occupant::Local { module, local } => module.rename(local, replacement),
      Occupant::External(external) => external.set_name(replacement),
      Occupant::Global => {}
    }
  }
}

#[derive(Default)]
struct Occupancy {
  by_name: HashMap<String, Vec<Occupant>>,
  // Names in first-seen order, so renaming is deterministic.
  order: Vec<String>,
}

impl Occupancy {
  fn occupy(&mut self, name: String, occupant: Occupant) {
    match self.by_name.get_mut(&name) {
      Some(occupants) => {
        if !occupants.iter().any(|o| o.is(&occupant)) {
          occupants.push(occupant);
        };
      }
      None => {
        self.order.push(name.clone());
        self.by_name.insert(name, vec![occupant]);
      }
    };
  }
}

/// Gives every top-level binding in the output a unique name. The last occupant of a name keeps
/// it; earlier ones get `_` prefixes until the name is free of top-level and nested bindings.
///
/// `modules` is in rank order, `included` in output order.
pub fn deconflict(
  modules: &[Arc<Module>],
  included: &[(Arc<Module>, StatementId)],
  namespaces: &[Arc<Module>],
  externals: &[Arc<ExternalModule>],
) {
  let _span = debug_span!("bundle_js.deconflict").entered();
  let mut occupancy = Occupancy::default();

  for module in modules.iter() {
    let statements = included
      .iter()
      .filter(|(m, _)| m.id == module.id)
      .map(move |(_, id)| &module.statements[*id]);
    for info in statements {
      for local in info.defines.iter() {
        if local == DEFAULT_SLOT {
          module.assign_slot_name(DEFAULT_SLOT);
        };
        occupancy.occupy(module.canonical_name(local), Occupant::Local {
          module: module.clone(),
          local: local.clone(),
        });
      }
    }
    if namespaces.iter().any(|ns| ns.id == module.id) {
      let name = module.assign_slot_name(NAMESPACE_SLOT);
      occupancy.occupy(name, Occupant::Local {
        module: module.clone(),
        local: NAMESPACE_SLOT.to_string(),
      });
    };
  }

  for external in externals.iter() {
    let name = external.preferred_name();
    external.set_name(name.clone());
    occupancy.occupy(name, Occupant::External(external.clone()));
  }

  for (module, id) in included.iter() {
    for name in module.statements[*id].depends_on.iter() {
      if !module.imports.contains_key(name) && !module.definitions.contains_key(name) {
        occupancy.occupy(name.clone(), Occupant::Global);
      };
    }
  }

  // A replacement must not be captured by a local of the same name in any nested scope.
  let mut taken: HashSet<String> = HashSet::new();
  taken.extend(occupancy.order.iter().cloned());
  for module in modules.iter() {
    taken.extend(module.scopes.nested_names().map(str::to_string));
  }
  for name in occupancy.order.iter() {
    let occupants = &occupancy.by_name[name];
    let Some((_, renamed)) = occupants.split_last() else {
      continue;
    };
    for occupant in renamed.iter() {
      let mut replacement = format!("_{name}");
      while taken.contains(&replacement) {
        replacement.insert(0, '_');
      }
      taken.insert(replacement.clone());
      debug!(name = name.as_str(), replacement = replacement.as_str(), "renamed binding");
      occupant.rename(replacement);
    }
  }
}
