use ahash::HashMap;
use ahash::HashMapExt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ScopeId(pub usize);

#[derive(Debug)]
pub struct Scope {
  pub parent: Option<ScopeId>,
  // Value is whether the binding is block scoped (`let`, `const`).
  names: HashMap<String, bool>,
  pub block: bool,
  pub depth: usize,
}

/// All scopes of one module, addressed by id. Scope 0 is the module's top level.
#[derive(Debug)]
pub struct ScopeTree {
  scopes: Vec<Scope>,
}

impl ScopeTree {
  pub const ROOT: ScopeId = ScopeId(0);

  pub fn new() -> ScopeTree {
    ScopeTree {
      scopes: vec![Scope {
        parent: None,
        names: HashMap::new(),
        block: false,
        depth: 0,
      }],
    }
  }

  pub fn len(&self) -> usize {
    self.scopes.len()
  }

  pub fn get(&self, id: ScopeId) -> &Scope {
    &self.scopes[id.0]
  }

  /// Creates a child of `parent` with `params` already bound in it.
  pub fn create(&mut self, parent: ScopeId, params: &[String], block: bool) -> ScopeId {
    let id = ScopeId(self.scopes.len());
    let names = params.iter().map(|name| (name.clone(), block)).collect();
    self.scopes.push(Scope {
      parent: Some(parent),
      names,
      block,
      depth: self.scopes[parent.0].depth + 1,
    });
    id
  }

  /// Binds `name` and returns the scope it landed in. Non-block-scoped bindings in a block scope
  /// are hoisted to the nearest function (or top-level) scope.
  pub fn add(&mut self, mut scope: ScopeId, name: &str, block_scoped: bool) -> ScopeId {
    if !block_scoped {
      while self.scopes[scope.0].block {
        match self.scopes[scope.0].parent {
          Some(parent) => scope = parent,
          None => break,
        };
      }
    };
    self.scopes[scope.0]
      .names
      .insert(name.to_string(), block_scoped);
    scope
  }

  /// Only checks the scope's own bindings.
  pub fn contains(&self, scope: ScopeId, name: &str) -> bool {
    self.scopes[scope.0].names.contains_key(name)
  }

  pub fn find_defining_scope(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
    let mut current = Some(scope);
    while let Some(id) = current {
      let scope = &self.scopes[id.0];
      if scope.names.contains_key(name) {
        return Some(id);
      };
      current = scope.parent;
    }
    None
  }

  pub fn depth(&self, scope: ScopeId) -> usize {
    self.scopes[scope.0].depth
  }

  /// Names bound directly in the module's top-level scope.
  pub fn root_names(&self) -> impl Iterator<Item = &str> {
    self.scopes[0].names.keys().map(|name| name.as_str())
  }

  /// Names bound in any function or block scope, with repeats.
  pub fn nested_names(&self) -> impl Iterator<Item = &str> {
    self.scopes[1..]
      .iter()
      .flat_map(|scope| scope.names.keys().map(|name| name.as_str()))
  }
}

impl Default for ScopeTree {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::ScopeTree;

  #[test]
  fn block_bindings_stay_in_block() {
    let mut tree = ScopeTree::new();
    let func = tree.create(ScopeTree::ROOT, &["p".to_string()], false);
    let block = tree.create(func, &[], true);
    assert_eq!(tree.add(block, "x", true), block);
    assert!(tree.contains(block, "x"));
    assert!(!tree.contains(func, "x"));
    assert_eq!(tree.find_defining_scope(block, "x"), Some(block));
    assert_eq!(tree.find_defining_scope(func, "x"), None);
  }

  #[test]
  fn var_bindings_hoist_to_function_scope() {
    let mut tree = ScopeTree::new();
    let func = tree.create(ScopeTree::ROOT, &["p".to_string()], false);
    let outer = tree.create(func, &[], true);
    let inner = tree.create(outer, &[], true);
    assert_eq!(tree.add(inner, "y", false), func);
    assert!(!tree.contains(inner, "y"));
    assert!(tree.contains(func, "y"));
    assert_eq!(tree.find_defining_scope(inner, "y"), Some(func));
    assert_eq!(tree.find_defining_scope(inner, "p"), Some(func));
  }

  #[test]
  fn top_level_blocks_hoist_to_root() {
    let mut tree = ScopeTree::new();
    let block = tree.create(ScopeTree::ROOT, &[], true);
    assert_eq!(tree.add(block, "z", false), ScopeTree::ROOT);
    assert_eq!(tree.depth(block), 1);
    assert_eq!(tree.depth(ScopeTree::ROOT), 0);
    assert_eq!(tree.find_defining_scope(block, "missing"), None);
    assert_eq!(tree.root_names().collect::<Vec<_>>(), vec!["z"]);
  }

  #[test]
  fn nested_names_skip_the_top_level() {
    let mut tree = ScopeTree::new();
    tree.add(ScopeTree::ROOT, "top", true);
    let func = tree.create(ScopeTree::ROOT, &["p".to_string()], false);
    let block = tree.create(func, &[], true);
    tree.add(block, "x", true);
    let mut names: Vec<_> = tree.nested_names().collect();
    names.sort();
    assert_eq!(names, vec!["p", "x"]);
  }
}
