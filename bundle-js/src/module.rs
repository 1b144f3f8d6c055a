use crate::analyse::Analysis;
use crate::ident::make_legal_identifier;
use crate::scope::ScopeTree;
use ahash::HashMap;
use ahash::HashMapExt;
use parking_lot::RwLock;
use parse_js::ast::node::Node;
use parse_js::ast::stx::TopLevel;
use parse_js::lex::Comment;
use parse_js::loc::Loc;
use serde::Serialize;
use std::path::PathBuf;

/// Identity of a loaded module. Only compared, never used for ordering output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize)]
pub struct ModuleId(pub usize);

/// Index of a statement in its module's top-level body.
pub type StatementId = usize;

/// Pseudo-local naming the value of `export default <expr>`.
pub const DEFAULT_SLOT: &str = "default";
/// Pseudo-local naming a module's namespace object.
pub const NAMESPACE_SLOT: &str = "*";

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ImportedName {
  Default,
  Namespace,
  Named(String),
}

impl ImportedName {
  pub fn from_export_name(name: &str) -> ImportedName {
    if name == DEFAULT_SLOT {
      ImportedName::Default
    } else {
      ImportedName::Named(name.to_string())
    }
  }

  /// The exported name to look up in the source module. None for a namespace import.
  pub fn export_name(&self) -> Option<&str> {
    match self {
      ImportedName::Default => Some(DEFAULT_SLOT),
      ImportedName::Namespace => None,
      ImportedName::Named(name) => Some(name),
    }
  }
}

#[derive(Clone, Debug)]
pub struct Import {
  pub source: String,
  pub name: ImportedName,
  pub loc: Loc,
}

#[derive(Clone, Debug)]
pub struct Export {
  // A top-level binding, a key of `imports`, or `DEFAULT_SLOT`.
  pub local: String,
  pub loc: Loc,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReferenceKind {
  Plain,
  // `{ a }` in an object literal or pattern; renaming must keep the property name.
  Shorthand,
}

/// An identifier occurrence that names a module-level binding or an unresolved global.
#[derive(Clone, Debug)]
pub struct Reference {
  pub loc: Loc,
  pub name: String,
  pub kind: ReferenceKind,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StatementKind {
  Plain,
  // `export <decl>` or `export default <named decl>`; output starts at the declaration.
  ExportDecl { decl_start: usize },
  // `export default <expr>`; output becomes a `var` holding the expression.
  ExportDefaultExpr { expr_start: usize },
  Import { source: String, bare: bool },
  ExportList,
}

impl StatementKind {
  /// Import and export-list statements never appear in the output.
  pub fn is_module_syntax(&self) -> bool {
    matches!(self, StatementKind::Import { .. } | StatementKind::ExportList)
  }
}

#[derive(Clone, Debug)]
pub struct StatementInfo {
  pub loc: Loc,
  pub kind: StatementKind,
  pub defines: Vec<String>,
  pub modifies: Vec<String>,
  pub depends_on: Vec<String>,
  pub leading_comments: Vec<Comment>,
  pub trailing_comment: Option<Comment>,
  // Blank lines before and after the statement.
  pub margin: (usize, usize),
  // Sorted by position.
  pub references: Vec<Reference>,
  pub removable: bool,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Dependency {
  Internal(PathBuf),
  External(String),
}

/// A parsed and analysed module. Shared through an `Arc` once loaded; only the name maps change
/// afterwards.
pub struct Module {
  pub id: ModuleId,
  pub path: PathBuf,
  pub source: String,
  pub ast: Node<TopLevel>,
  pub scopes: ScopeTree,
  pub statements: Vec<StatementInfo>,
  pub imports: HashMap<String, Import>,
  pub exports: HashMap<String, Export>,
  // Export names in declaration order.
  pub export_order: Vec<String>,
  pub star_exports: Vec<String>,
  // Resolved import sources, in first-appearance order.
  pub dependencies: Vec<(String, Dependency)>,
  pub definitions: HashMap<String, StatementId>,
  pub modifications: HashMap<String, Vec<StatementId>>,
  canonical_names: RwLock<HashMap<String, String>>,
  suggested_names: RwLock<HashMap<String, String>>,
}

impl Module {
  pub fn new(
    id: ModuleId,
    path: PathBuf,
    source: String,
    ast: Node<TopLevel>,
    analysis: Analysis,
    dependencies: Vec<(String, Dependency)>,
  ) -> Module {
    Module {
      id,
      path,
      source,
      ast,
      scopes: analysis.scopes,
      statements: analysis.statements,
      imports: analysis.imports,
      exports: analysis.exports,
      export_order: analysis.export_order,
      star_exports: analysis.star_exports,
      dependencies,
      definitions: analysis.definitions,
      modifications: analysis.modifications,
      canonical_names: RwLock::new(HashMap::new()),
      suggested_names: RwLock::new(HashMap::new()),
    }
  }

  pub fn comments(&self) -> &[Comment] {
    &self.ast.stx.comments
  }

  pub fn dependency(&self, source: &str) -> Option<&Dependency> {
    self
      .dependencies
      .iter()
      .find(|(specifier, _)| specifier == source)
      .map(|(_, dep)| dep)
  }

  /// Legal identifier derived from the file name, e.g. `utils` for `src/utils.js`.
  pub fn stem_name(&self) -> String {
    let stem = self
      .path
      .file_stem()
      .map(|stem| stem.to_string_lossy().into_owned())
      .unwrap_or_default();
    make_legal_identifier(&stem)
  }

  /// Records a name for the default or namespace slot. The first suggestion wins.
  pub fn suggest_name(&self, slot: &str, candidate: &str) {
    self
      .suggested_names
      .write()
      .entry(slot.to_string())
      .or_insert_with(|| make_legal_identifier(candidate));
  }

  pub fn suggested_name(&self, slot: &str) -> Option<String> {
    self.suggested_names.read().get(slot).cloned()
  }

  /// Whether `name` is taken by the module's own top-level bindings or imports.
  pub fn binds(&self, name: &str) -> bool {
    self.scopes.contains(ScopeTree::ROOT, name) || self.imports.contains_key(name)
  }

  /// Gives a slot its initial display name: the suggestion or the file stem, `_`-prefixed until
  /// it no longer collides with the module's own bindings.
  pub fn assign_slot_name(&self, slot: &str) -> String {
    let mut name = self
      .suggested_name(slot)
      .unwrap_or_else(|| self.stem_name());
    while self.binds(&name) {
      name.insert(0, '_');
    }
    self
      .canonical_names
      .write()
      .insert(slot.to_string(), name.clone());
    name
  }

  pub fn rename(&self, name: &str, replacement: String) {
    self
      .canonical_names
      .write()
      .insert(name.to_string(), replacement);
  }

  pub fn canonical_name(&self, name: &str) -> String {
    self
      .canonical_names
      .read()
      .get(name)
      .cloned()
      .unwrap_or_else(|| name.to_string())
  }

  /// Overrides recorded so far, sorted by original name.
  pub fn renames(&self) -> Vec<(String, String)> {
    let mut renames: Vec<_> = self
      .canonical_names
      .read()
      .iter()
      .filter(|(name, replacement)| name != replacement)
      .map(|(name, replacement)| (name.clone(), replacement.clone()))
      .collect();
    renames.sort();
    renames
  }
}

impl std::fmt::Debug for Module {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Module")
      .field("id", &self.id)
      .field("path", &self.path)
      .finish()
  }
}

/// A module that is imported but not bundled. It is referenced by a single variable in the output.
#[derive(Debug)]
pub struct ExternalModule {
  pub specifier: String,
  suggested_names: RwLock<HashMap<String, String>>,
  name: RwLock<String>,
}

impl ExternalModule {
  pub fn new(specifier: String) -> ExternalModule {
    let name = make_legal_identifier(&specifier);
    ExternalModule {
      specifier,
      suggested_names: RwLock::new(HashMap::new()),
      name: RwLock::new(name),
    }
  }

  pub fn suggest_name(&self, slot: &str, candidate: &str) {
    self
      .suggested_names
      .write()
      .entry(slot.to_string())
      .or_insert_with(|| make_legal_identifier(candidate));
  }

  /// The namespace suggestion, then the default suggestion, then the legalised specifier.
  pub fn preferred_name(&self) -> String {
    let suggested = self.suggested_names.read();
    let name = suggested
      .get(NAMESPACE_SLOT)
      .or_else(|| suggested.get(DEFAULT_SLOT))
      .cloned();
    name.unwrap_or_else(|| make_legal_identifier(&self.specifier))
  }

  pub fn name(&self) -> String {
    self.name.read().clone()
  }

  pub fn set_name(&self, name: String) {
    *self.name.write() = name;
  }
}

#[cfg(test)]
mod tests {
  use super::ExternalModule;
  use super::DEFAULT_SLOT;
  use super::NAMESPACE_SLOT;

  #[test]
  fn external_names_prefer_namespace_suggestions() {
    let ext = ExternalModule::new("lodash-es".into());
    assert_eq!(ext.preferred_name(), "lodashEs");
    ext.suggest_name(DEFAULT_SLOT, "lo");
    assert_eq!(ext.preferred_name(), "lo");
    ext.suggest_name(NAMESPACE_SLOT, "_");
    ext.suggest_name(NAMESPACE_SLOT, "ignored");
    assert_eq!(ext.preferred_name(), "_");
  }
}
