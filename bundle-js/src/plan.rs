use crate::generate::ExternalInfo;
use crate::module::StatementId;
use crate::Bundle;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Serialize)]
pub struct PlannedStatement {
  pub index: StatementId,
  pub defines: Vec<String>,
  pub depends_on: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlannedModule {
  pub path: PathBuf,
  pub statements: Vec<PlannedStatement>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlannedRename {
  pub module: PathBuf,
  pub name: String,
  pub renamed: String,
}

/// What a build decided, without the generated code.
#[derive(Clone, Debug, Serialize)]
pub struct BundlePlan {
  pub entry: PathBuf,
  // In output order.
  pub modules: Vec<PlannedModule>,
  pub externals: Vec<ExternalInfo>,
  pub renames: Vec<PlannedRename>,
}

impl Bundle {
  pub fn plan(&self) -> BundlePlan {
    let modules = self
      .modules
      .iter()
      .map(|module| PlannedModule {
        path: module.path.clone(),
        statements: self
          .shaken
          .included
          .iter()
          .filter(|(m, _)| m.id == module.id)
          .map(|(_, index)| {
            let info = &module.statements[*index];
            PlannedStatement {
              index: *index,
              defines: info.defines.clone(),
              depends_on: info.depends_on.clone(),
            }
          })
          .collect(),
      })
      .collect();
    let renames = self
      .modules
      .iter()
      .flat_map(|module| {
        module
          .renames()
          .into_iter()
          .map(|(name, renamed)| PlannedRename {
            module: module.path.clone(),
            name,
            renamed,
          })
      })
      .collect();
    BundlePlan {
      entry: self.entry.path.clone(),
      modules,
      externals: self
        .externals
        .iter()
        .map(|external| ExternalInfo {
          specifier: external.specifier.clone(),
          name: external.name(),
        })
        .collect(),
      renames,
    }
  }
}
