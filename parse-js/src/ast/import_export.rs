use super::node::Node;
use super::stmt::decl::PatDecl;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Deserialize;
use serde::Serialize;

/// A name as written in an import or export clause. String names (`export { a as "b c" }`) are decoded.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub enum ModuleExportImportName {
  Ident(String),
  Str(String),
}

impl ModuleExportImportName {
  pub fn as_str(&self) -> &str {
    match self {
      ModuleExportImportName::Ident(name) | ModuleExportImportName::Str(name) => name,
    }
  }
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExportName {
  #[drive(skip)]
  pub exportable: ModuleExportImportName,
  // Same as `exportable` when there is no `as` clause.
  #[drive(skip)]
  pub alias: ModuleExportImportName,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum ExportNames {
  // `export * from "module"`
  // `export * as name from "module"`
  All(#[drive(skip)] Option<ModuleExportImportName>),
  // `export {a as default, b as c, d}`
  // `export {default, a as b, c} from "module"`
  Specific(Vec<Node<ExportName>>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ImportName {
  #[drive(skip)]
  pub importable: ModuleExportImportName,
  // Always set, even without an `as` clause. Always an IdPat.
  pub alias: Node<PatDecl>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum ImportNames {
  // `import * as name`
  All(Node<PatDecl>),
  // `import {a as b, c, default as e}`
  Specific(Vec<Node<ImportName>>),
}

#[cfg(test)]
mod tests {
  use super::ModuleExportImportName;
  use serde_json::json;

  #[test]
  fn module_export_import_name_serializes_with_tag() {
    let ident = ModuleExportImportName::Ident("a".into());
    assert_eq!(serde_json::to_value(&ident).unwrap(), json!({"Ident": "a"}));
    let string_name = ModuleExportImportName::Str("a b".into());
    let value = serde_json::to_value(&string_name).unwrap();
    assert_eq!(value, json!({"Str": "a b"}));
    let roundtrip: ModuleExportImportName = serde_json::from_value(value).unwrap();
    assert_eq!(roundtrip.as_str(), "a b");
  }
}
