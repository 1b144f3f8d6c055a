use crate::error::BundleResult;
use crate::ident::is_identifier_name;
use crate::ident::member_access;
use crate::ident::quote_string;
use crate::link::resolve_import;
use crate::link::Binding;
use crate::module::ImportedName;
use crate::module::Module;
use crate::module::ModuleId;
use crate::module::ReferenceKind;
use crate::module::StatementInfo;
use crate::module::StatementKind;
use crate::module::DEFAULT_SLOT;
use crate::module::NAMESPACE_SLOT;
use crate::Bundle;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use tracing::debug_span;

/// An external module the bundle expects its wrapper to provide.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct ExternalInfo {
  pub specifier: String,
  // Variable the bundle reads the module from.
  pub name: String,
}

#[derive(Clone, Debug)]
pub struct Output {
  pub code: String,
  pub externals: Vec<ExternalInfo>,
  // Exported name and the top-level variable that holds it.
  pub exports: Vec<(String, String)>,
}

/// The expression a binding is emitted as.
pub fn binding_name(binding: &Binding) -> String {
  match binding {
    Binding::Local { module, local } => module.canonical_name(local),
    Binding::Namespace { module } => module.canonical_name(NAMESPACE_SLOT),
    Binding::External { external, name } => match name {
      ImportedName::Default | ImportedName::Namespace => external.name(),
      ImportedName::Named(name) => member_access(&external.name(), name),
    },
  }
}

struct Chunk {
  module: ModuleId,
  // Blank lines wanted before and after.
  margin: (usize, usize),
  text: String,
}

impl Bundle {
  fn reference_name(&self, module: &Arc<Module>, name: &str) -> BundleResult<String> {
    if !module.imports.contains_key(name) {
      return Ok(module.canonical_name(name));
    };
    let binding = match self.shaken.bindings.get(&(module.id, name.to_string())) {
      Some(binding) => binding.clone(),
      None => resolve_import(&self.loader, module, name)?,
    };
    Ok(binding_name(&binding))
  }

  fn statement_text(&self, module: &Arc<Module>, info: &StatementInfo) -> BundleResult<String> {
    let end = info.loc.1;
    let (start, mut out) = match &info.kind {
      StatementKind::ExportDecl { decl_start } => (*decl_start, String::new()),
      StatementKind::ExportDefaultExpr { expr_start } => (
        *expr_start,
        format!("var {} = ", module.canonical_name(DEFAULT_SLOT)),
      ),
      _ => (info.loc.0, String::new()),
    };
    let source = module.source.as_str();
    let mut cursor = start;
    for reference in info.references.iter() {
      // `export` headers are dropped along with anything referenced in them.
      if reference.loc.0 < cursor || reference.loc.1 > end {
        continue;
      };
      let replacement = self.reference_name(module, &reference.name)?;
      if replacement == reference.name {
        continue;
      };
      out.push_str(&source[cursor..reference.loc.0]);
      if reference.kind == ReferenceKind::Shorthand {
        out.push_str(&reference.name);
        out.push_str(": ");
      };
      out.push_str(&replacement);
      cursor = reference.loc.1;
    }
    out.push_str(&source[cursor..end]);
    if matches!(info.kind, StatementKind::ExportDefaultExpr { .. }) {
      out.truncate(out.trim_end().len());
      if !out.ends_with(';') {
        out.push(';');
      };
    };
    Ok(out)
  }

  fn statement_chunk(&self, module: &Arc<Module>, info: &StatementInfo) -> BundleResult<Chunk> {
    let source = module.source.as_str();
    let mut text = String::new();
    if self.options.comments {
      for comment in info.leading_comments.iter() {
        text.push_str(comment.loc.slice(source));
        text.push('\n');
      }
    };
    text.push_str(&self.statement_text(module, info)?);
    if self.options.comments {
      if let Some(comment) = &info.trailing_comment {
        text.push(' ');
        text.push_str(comment.loc.slice(source));
      };
    };
    Ok(Chunk {
      module: module.id,
      margin: info.margin,
      text,
    })
  }

  fn namespace_chunk(&self, module: &Arc<Module>, exports: &[(String, Binding)]) -> Chunk {
    let name = module.canonical_name(NAMESPACE_SLOT);
    let text = if exports.is_empty() {
      format!("var {name} = {{}};")
    } else {
      let getters: Vec<String> = exports
        .iter()
        .map(|(exported, binding)| {
          let key = if is_identifier_name(exported) {
            exported.clone()
          } else {
            quote_string(exported)
          };
          format!("  get {key} () {{ return {}; }}", binding_name(binding))
        })
        .collect();
      format!("var {name} = {{\n{}\n}};", getters.join(",\n"))
    };
    Chunk {
      module: module.id,
      margin: (0, 0),
      text,
    }
  }

  /// Writes the included statements out as one script.
  pub fn generate(&self) -> BundleResult<Output> {
    let _span = debug_span!("bundle_js.generate").entered();
    let mut chunks = Vec::new();
    let mut included = self.shaken.included.iter().peekable();
    for module in self.modules.iter() {
      while let Some((_, id)) = included.next_if(|(m, _)| m.id == module.id) {
        let info = &module.statements[*id];
        if info.kind.is_module_syntax() {
          continue;
        };
        chunks.push(self.statement_chunk(module, info)?);
      }
      if let Some((_, exports)) = self
        .shaken
        .namespaces
        .iter()
        .find(|(ns, _)| ns.id == module.id)
      {
        chunks.push(self.namespace_chunk(module, exports));
      };
    }

    let mut code = String::new();
    let mut prev: Option<&Chunk> = None;
    for chunk in chunks.iter() {
      if let Some(prev) = prev {
        let lines = if self.options.margins && prev.module == chunk.module {
          prev.margin.1.max(chunk.margin.0) + 1
        } else {
          1
        };
        code.push_str(&"\n".repeat(lines));
      };
      code.push_str(&chunk.text);
      prev = Some(chunk);
    }
    if !code.is_empty() {
      code.push('\n');
    };

    let externals = self
      .externals
      .iter()
      .map(|external| ExternalInfo {
        specifier: external.specifier.clone(),
        name: external.name(),
      })
      .collect();
    let exports = self
      .shaken
      .exports
      .iter()
      .map(|(exported, binding)| (exported.clone(), binding_name(binding)))
      .collect();
    debug!(bytes = code.len(), chunks = chunks.len(), "generated bundle");
    Ok(Output {
      code,
      externals,
      exports,
    })
  }
}
