use crate::error::BundleError;
use crate::error::BundleResult;
use crate::module::Export;
use crate::module::Import;
use crate::module::ImportedName;
use crate::module::Reference;
use crate::module::ReferenceKind;
use crate::module::StatementId;
use crate::module::StatementInfo;
use crate::module::StatementKind;
use crate::module::DEFAULT_SLOT;
use crate::scope::ScopeId;
use crate::scope::ScopeTree;
use crate::side_effects::is_removable;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;
use derive_visitor::Drive;
use derive_visitor::Visitor;
use parse_js::ast::class_or_object::ObjMember;
use parse_js::ast::class_or_object::ObjMemberType;
use parse_js::ast::expr::pat::ArrPat;
use parse_js::ast::expr::pat::IdPat;
use parse_js::ast::expr::pat::ObjPat;
use parse_js::ast::expr::pat::ObjPatProp;
use parse_js::ast::expr::pat::Pat;
use parse_js::ast::expr::BinaryExpr;
use parse_js::ast::expr::CallExpr;
use parse_js::ast::expr::ClassExpr;
use parse_js::ast::expr::Expr;
use parse_js::ast::expr::FuncExpr;
use parse_js::ast::expr::IdExpr;
use parse_js::ast::expr::UnaryExpr;
use parse_js::ast::expr::UnaryPostfixExpr;
use parse_js::ast::func::Func;
use parse_js::ast::import_export::ExportNames;
use parse_js::ast::import_export::ImportNames;
use parse_js::ast::node::Node;
use parse_js::ast::stmt::decl::ClassDecl;
use parse_js::ast::stmt::decl::FuncDecl;
use parse_js::ast::stmt::decl::PatDecl;
use parse_js::ast::stmt::decl::VarDecl;
use parse_js::ast::stmt::decl::VarDeclMode;
use parse_js::ast::stmt::BlockStmt;
use parse_js::ast::stmt::CatchBlock;
use parse_js::ast::stmt::ForInOfLhs;
use parse_js::ast::stmt::ForInStmt;
use parse_js::ast::stmt::ForOfStmt;
use parse_js::ast::stmt::ForTripleStmt;
use parse_js::ast::stmt::Stmt;
use parse_js::ast::stmt::SwitchStmt;
use parse_js::ast::stx::TopLevel;
use parse_js::lex::Comment;
use parse_js::loc::Loc;
use parse_js::loc::Location;
use parse_js::operator::OperatorName;
use std::path::Path;
use tracing::trace;

type BinaryExprNode = Node<BinaryExpr>;
type BlockStmtNode = Node<BlockStmt>;
type CallExprNode = Node<CallExpr>;
type CatchBlockNode = Node<CatchBlock>;
type ClassDeclNode = Node<ClassDecl>;
type ClassExprNode = Node<ClassExpr>;
type ForInStmtNode = Node<ForInStmt>;
type ForOfStmtNode = Node<ForOfStmt>;
type ForTripleStmtNode = Node<ForTripleStmt>;
type FuncDeclNode = Node<FuncDecl>;
type FuncExprNode = Node<FuncExpr>;
type FuncNode = Node<Func>;
type IdExprNode = Node<IdExpr>;
type IdPatNode = Node<IdPat>;
type ObjMemberNode = Node<ObjMember>;
type ObjPatPropNode = Node<ObjPatProp>;
type SwitchStmtNode = Node<SwitchStmt>;
type UnaryExprNode = Node<UnaryExpr>;
type UnaryPostfixExprNode = Node<UnaryPostfixExpr>;
type VarDeclNode = Node<VarDecl>;

/// Everything learned about a module from its source, before its imports are resolved.
pub struct Analysis {
  pub scopes: ScopeTree,
  pub statements: Vec<StatementInfo>,
  pub imports: HashMap<String, Import>,
  pub exports: HashMap<String, Export>,
  pub export_order: Vec<String>,
  pub star_exports: Vec<String>,
  // Every import and re-export source, in first-appearance order.
  pub sources: Vec<String>,
  pub definitions: HashMap<String, StatementId>,
  pub modifications: HashMap<String, Vec<StatementId>>,
}

fn push_unique(names: &mut Vec<String>, name: &str) {
  if !names.iter().any(|n| n == name) {
    names.push(name.to_string());
  };
}

pub fn pat_bindings(pat: &Node<Pat>, out: &mut Vec<(String, Loc)>) {
  match pat.stx.as_ref() {
    Pat::Id(id) => out.push((id.stx.name.clone(), id.loc)),
    Pat::Arr(arr) => arr_pat_bindings(&arr.stx, out),
    Pat::Obj(obj) => obj_pat_bindings(&obj.stx, out),
  }
}

fn arr_pat_bindings(arr: &ArrPat, out: &mut Vec<(String, Loc)>) {
  for elem in arr.elements.iter().flatten() {
    pat_bindings(&elem.target, out);
  }
  if let Some(rest) = &arr.rest {
    pat_bindings(rest, out);
  };
}

fn obj_pat_bindings(obj: &ObjPat, out: &mut Vec<(String, Loc)>) {
  for prop in obj.properties.iter() {
    pat_bindings(&prop.stx.target, out);
  }
  if let Some(rest) = &obj.rest {
    out.push((rest.stx.name.clone(), rest.loc));
  };
}

fn decl_bindings(decl: &Node<PatDecl>) -> Vec<(String, Loc)> {
  let mut out = Vec::new();
  pat_bindings(&decl.stx.pat, &mut out);
  out
}

fn decl_names(decl: &Node<PatDecl>) -> Vec<String> {
  decl_bindings(decl)
    .into_iter()
    .map(|(name, _)| name)
    .collect()
}

// Identifiers written by an assignment to `expr`. A member write such as `a.b = 1` writes its
// root object `a`.
fn assignment_targets(expr: &Node<Expr>, out: &mut Vec<(String, Loc)>) {
  match expr.stx.as_ref() {
    Expr::Id(id) => out.push((id.stx.name.clone(), id.loc)),
    Expr::IdPat(id) => out.push((id.stx.name.clone(), id.loc)),
    Expr::Member(member) => assignment_targets(&member.stx.left, out),
    Expr::ComputedMember(member) => assignment_targets(&member.stx.object, out),
    Expr::ArrPat(arr) => arr_pat_bindings(&arr.stx, out),
    Expr::ObjPat(obj) => obj_pat_bindings(&obj.stx, out),
    _ => {}
  };
}

// Builds the import and export tables from the top-level module syntax.
struct ModuleRecord<'a> {
  path: &'a Path,
  source: &'a str,
  imports: HashMap<String, Import>,
  exports: HashMap<String, Export>,
  export_order: Vec<String>,
  star_exports: Vec<String>,
  sources: Vec<String>,
}

impl<'a> ModuleRecord<'a> {
  fn new(path: &'a Path, source: &'a str) -> Self {
    Self {
      path,
      source,
      imports: HashMap::new(),
      exports: HashMap::new(),
      export_order: Vec::new(),
      star_exports: Vec::new(),
      sources: Vec::new(),
    }
  }

  fn add_source(&mut self, source: &str) {
    push_unique(&mut self.sources, source);
  }

  fn add_import(
    &mut self,
    local: String,
    loc: Loc,
    source: &str,
    name: ImportedName,
  ) -> BundleResult<()> {
    if self.imports.contains_key(&local) {
      return Err(BundleError::DuplicateImport {
        path: self.path.to_path_buf(),
        name: local,
        location: Location::from_offset(self.source, loc.0),
      });
    };
    self.imports.insert(local, Import {
      source: source.to_string(),
      name,
      loc,
    });
    Ok(())
  }

  // Re-exports go through `imports` under a key that cannot clash with a real binding.
  fn add_reexport(&mut self, from: &str, name: ImportedName, loc: Loc) -> String {
    let key = format!("{from}#{}", name.export_name().unwrap_or("*"));
    self.imports.insert(key.clone(), Import {
      source: from.to_string(),
      name,
      loc,
    });
    key
  }

  fn add_export(&mut self, exported: &str, local: &str, loc: Loc) {
    let export = Export {
      local: local.to_string(),
      loc,
    };
    if self.exports.insert(exported.to_string(), export).is_none() {
      self.export_order.push(exported.to_string());
    };
  }

  fn statement(&mut self, stmt: &Node<Stmt>) -> BundleResult<StatementKind> {
    Ok(match stmt.stx.as_ref() {
      Stmt::Import(import) => {
        let module = &import.stx.module;
        self.add_source(module);
        if let Some(default) = &import.stx.default {
          for (local, loc) in decl_bindings(default) {
            self.add_import(local, loc, module, ImportedName::Default)?;
          }
        };
        let mut bare = import.stx.default.is_none();
        match &import.stx.names {
          Some(ImportNames::All(alias)) => {
            bare = false;
            for (local, loc) in decl_bindings(alias) {
              self.add_import(local, loc, module, ImportedName::Namespace)?;
            }
          }
          Some(ImportNames::Specific(names)) => {
            bare &= names.is_empty();
            for name in names.iter() {
              let imported = ImportedName::from_export_name(name.stx.importable.as_str());
              for (local, loc) in decl_bindings(&name.stx.alias) {
                self.add_import(local, loc, module, imported.clone())?;
              }
            }
          }
          None => {}
        };
        StatementKind::Import {
          source: module.clone(),
          bare,
        }
      }
      Stmt::ExportList(list) => {
        match (&list.stx.names, &list.stx.from) {
          (ExportNames::Specific(names), None) => {
            for name in names.iter() {
              self.add_export(
                name.stx.alias.as_str(),
                name.stx.exportable.as_str(),
                name.loc,
              );
            }
          }
          (ExportNames::Specific(names), Some(from)) => {
            self.add_source(from);
            for name in names.iter() {
              let imported = ImportedName::from_export_name(name.stx.exportable.as_str());
              let key = self.add_reexport(from, imported, name.loc);
              self.add_export(name.stx.alias.as_str(), &key, name.loc);
            }
          }
          (ExportNames::All(None), Some(from)) => {
            self.add_source(from);
            push_unique(&mut self.star_exports, from);
          }
          (ExportNames::All(Some(alias)), Some(from)) => {
            self.add_source(from);
            let key = self.add_reexport(from, ImportedName::Namespace, list.loc);
            self.add_export(alias.as_str(), &key, list.loc);
          }
          (ExportNames::All(_), None) => {}
        };
        StatementKind::ExportList
      }
      Stmt::ExportDefaultExpr(export) => {
        self.add_export(DEFAULT_SLOT, DEFAULT_SLOT, stmt.loc);
        StatementKind::ExportDefaultExpr {
          expr_start: self.default_expr_start(stmt.loc, export.stx.expression.loc),
        }
      }
      Stmt::FunctionDecl(decl) if decl.stx.export => {
        let name = &decl.stx.name;
        self.add_decl_export(decl.stx.export_default, &name.stx.name, name.loc);
        StatementKind::ExportDecl {
          decl_start: decl.loc.0,
        }
      }
      Stmt::ClassDecl(decl) if decl.stx.export => {
        let name = &decl.stx.name;
        self.add_decl_export(decl.stx.export_default, &name.stx.name, name.loc);
        StatementKind::ExportDecl {
          decl_start: decl.loc.0,
        }
      }
      Stmt::VarDecl(decl) if decl.stx.export => {
        for declarator in decl.stx.declarators.iter() {
          for (name, loc) in decl_bindings(&declarator.pattern) {
            self.add_export(&name, &name, loc);
          }
        }
        StatementKind::ExportDecl {
          decl_start: decl.loc.0,
        }
      }
      _ => StatementKind::Plain,
    })
  }

  fn add_decl_export(&mut self, export_default: bool, name: &str, loc: Loc) {
    if export_default {
      self.add_export(DEFAULT_SLOT, name, loc);
    } else {
      self.add_export(name, name, loc);
    };
  }

  // Start of the text after `export default`. The expression's own loc may exclude wrapping
  // parentheses, so this is found from the keyword instead.
  fn default_expr_start(&self, stmt: Loc, expr: Loc) -> usize {
    let header = &self.source[stmt.0..expr.0];
    match header.find("default") {
      Some(offset) => {
        let after = stmt.0 + offset + DEFAULT_SLOT.len();
        let rest = &self.source[after..expr.0];
        after + (rest.len() - rest.trim_start().len())
      }
      None => expr.0,
    }
  }
}

// Walk 1: builds every scope and collects top-level declarations.
#[derive(Visitor)]
#[visitor(
  BlockStmtNode,
  CatchBlockNode,
  ClassDeclNode(enter),
  ClassExprNode,
  ForInOfLhs(enter),
  ForInStmtNode,
  ForOfStmtNode,
  ForTripleStmtNode,
  FuncDeclNode(enter),
  FuncExprNode(enter),
  FuncNode,
  SwitchStmtNode,
  VarDeclNode(enter)
)]
struct DeclareVisitor {
  scopes: ScopeTree,
  scope_stack: Vec<ScopeId>,
  // Name of the function expression whose Func node is about to be entered.
  func_expr_name: Option<String>,
  defines: Vec<String>,
}

impl DeclareVisitor {
  fn current_scope(&self) -> ScopeId {
    self
      .scope_stack
      .last()
      .copied()
      .unwrap_or(ScopeTree::ROOT)
  }

  fn push_scope(&mut self, params: &[String], block: bool) {
    let id = self.scopes.create(self.current_scope(), params, block);
    self.scope_stack.push(id);
  }

  fn pop_scope(&mut self) {
    self.scope_stack.pop();
  }

  fn declare(&mut self, name: &str, block_scoped: bool) {
    if self.scopes.add(self.current_scope(), name, block_scoped) == ScopeTree::ROOT {
      push_unique(&mut self.defines, name);
    };
  }

  fn enter_block_stmt_node(&mut self, _: &BlockStmtNode) {
    self.push_scope(&[], true);
  }

  fn exit_block_stmt_node(&mut self, _: &BlockStmtNode) {
    self.pop_scope();
  }

  fn enter_catch_block_node(&mut self, node: &CatchBlockNode) {
    let params = node
      .stx
      .parameter
      .as_ref()
      .map(decl_names)
      .unwrap_or_default();
    self.push_scope(&params, true);
  }

  fn exit_catch_block_node(&mut self, _: &CatchBlockNode) {
    self.pop_scope();
  }

  fn enter_class_decl_node(&mut self, node: &ClassDeclNode) {
    self.declare(&node.stx.name.stx.name, false);
  }

  fn enter_class_expr_node(&mut self, node: &ClassExprNode) {
    if let Some(name) = &node.stx.name {
      self.push_scope(&[name.stx.name.clone()], true);
    };
  }

  fn exit_class_expr_node(&mut self, node: &ClassExprNode) {
    if node.stx.name.is_some() {
      self.pop_scope();
    };
  }

  fn enter_for_in_of_lhs(&mut self, lhs: &ForInOfLhs) {
    if let ForInOfLhs::Decl { mode, pattern } = lhs {
      for name in decl_names(pattern) {
        self.declare(&name, *mode != VarDeclMode::Var);
      }
    };
  }

  fn enter_for_in_stmt_node(&mut self, _: &ForInStmtNode) {
    self.push_scope(&[], true);
  }

  fn exit_for_in_stmt_node(&mut self, _: &ForInStmtNode) {
    self.pop_scope();
  }

  fn enter_for_of_stmt_node(&mut self, _: &ForOfStmtNode) {
    self.push_scope(&[], true);
  }

  fn exit_for_of_stmt_node(&mut self, _: &ForOfStmtNode) {
    self.pop_scope();
  }

  fn enter_for_triple_stmt_node(&mut self, _: &ForTripleStmtNode) {
    self.push_scope(&[], true);
  }

  fn exit_for_triple_stmt_node(&mut self, _: &ForTripleStmtNode) {
    self.pop_scope();
  }

  fn enter_func_decl_node(&mut self, node: &FuncDeclNode) {
    self.declare(&node.stx.name.stx.name, false);
  }

  fn enter_func_expr_node(&mut self, node: &FuncExprNode) {
    self.func_expr_name = node.stx.name.as_ref().map(|name| name.stx.name.clone());
  }

  fn enter_func_node(&mut self, node: &FuncNode) {
    let mut params: Vec<String> = node
      .stx
      .parameters
      .iter()
      .flat_map(|param| decl_names(&param.stx.pattern))
      .collect();
    if let Some(name) = self.func_expr_name.take() {
      params.push(name);
    };
    self.push_scope(&params, false);
  }

  fn exit_func_node(&mut self, _: &FuncNode) {
    self.pop_scope();
  }

  fn enter_switch_stmt_node(&mut self, _: &SwitchStmtNode) {
    self.push_scope(&[], true);
  }

  fn exit_switch_stmt_node(&mut self, _: &SwitchStmtNode) {
    self.pop_scope();
  }

  fn enter_var_decl_node(&mut self, node: &VarDeclNode) {
    let block_scoped = node.stx.mode != VarDeclMode::Var;
    for declarator in node.stx.declarators.iter() {
      for name in decl_names(&declarator.pattern) {
        self.declare(&name, block_scoped);
      }
    }
  }
}

// Walk 2: reads, writes, and references. Scopes are revisited in the order walk 1 created them,
// so the ids line up without storing anything on the AST.
#[derive(Visitor)]
#[visitor(
  BinaryExprNode(enter),
  BlockStmtNode,
  CallExprNode(enter),
  CatchBlockNode,
  ClassDeclNode(enter),
  ClassExprNode,
  ForInOfLhs(enter),
  ForInStmtNode,
  ForOfStmtNode,
  ForTripleStmtNode,
  FuncDeclNode(enter),
  FuncNode,
  IdExprNode(enter),
  IdPatNode(enter),
  ObjMemberNode(enter),
  ObjPatPropNode(enter),
  SwitchStmtNode,
  UnaryExprNode(enter),
  UnaryPostfixExprNode(enter)
)]
struct UsageVisitor {
  scopes: ScopeTree,
  scope_stack: Vec<ScopeId>,
  last_scope: usize,
  imports: HashSet<String>,
  defines: Vec<String>,
  depends_on: Vec<String>,
  modifies: Vec<String>,
  references: Vec<Reference>,
  shorthands: HashSet<Loc>,
  reassigned_import: Option<(String, Loc)>,
}

impl UsageVisitor {
  fn current_scope(&self) -> ScopeId {
    self
      .scope_stack
      .last()
      .copied()
      .unwrap_or(ScopeTree::ROOT)
  }

  fn push_scope(&mut self) {
    self.last_scope += 1;
    self.scope_stack.push(ScopeId(self.last_scope));
  }

  fn pop_scope(&mut self) {
    self.scope_stack.pop();
  }

  // True if `name` is bound inside a function or block rather than at the module level.
  fn is_local(&self, name: &str) -> bool {
    self
      .scopes
      .find_defining_scope(self.current_scope(), name)
      .is_some_and(|scope| scope != ScopeTree::ROOT)
  }

  fn reference(&mut self, name: &str, loc: Loc) {
    let kind = if self.shorthands.contains(&loc) {
      ReferenceKind::Shorthand
    } else {
      ReferenceKind::Plain
    };
    self.references.push(Reference {
      loc,
      name: name.to_string(),
      kind,
    });
  }

  fn read(&mut self, name: &str, loc: Loc) {
    // Synthesised nodes, like the implicit `undefined` of a bare `yield`, have no source text.
    if loc.is_empty() || self.is_local(name) {
      return;
    };
    self.reference(name, loc);
    if !self.defines.iter().any(|d| d == name) {
      push_unique(&mut self.depends_on, name);
    };
  }

  // Imported bindings and namespaces are read-only, including their members. Call arguments are
  // not strict: passing an import to a function is not a write to it.
  fn write(&mut self, name: &str, loc: Loc, strict: bool) {
    if self.is_local(name) {
      return;
    };
    if strict && self.imports.contains(name) {
      self
        .reassigned_import
        .get_or_insert_with(|| (name.to_string(), loc));
      return;
    };
    push_unique(&mut self.modifies, name);
  }

  fn write_expr(&mut self, expr: &Node<Expr>, strict: bool) {
    let mut targets = Vec::new();
    assignment_targets(expr, &mut targets);
    for (name, loc) in targets {
      self.write(&name, loc, strict);
    }
  }

  fn declaration_name(&mut self, name: &str, loc: Loc) {
    if self
      .scopes
      .find_defining_scope(self.current_scope(), name)
      .is_some_and(|scope| scope == ScopeTree::ROOT)
    {
      self.reference(name, loc);
    };
  }

  fn enter_binary_expr_node(&mut self, node: &BinaryExprNode) {
    if node.stx.operator.is_assignment() {
      self.write_expr(&node.stx.left, true);
    };
  }

  fn enter_block_stmt_node(&mut self, _: &BlockStmtNode) {
    self.push_scope();
  }

  fn exit_block_stmt_node(&mut self, _: &BlockStmtNode) {
    self.pop_scope();
  }

  // Arguments may be mutated by the callee.
  fn enter_call_expr_node(&mut self, node: &CallExprNode) {
    for arg in node.stx.arguments.iter() {
      self.write_expr(&arg.stx.value, false);
    }
  }

  fn enter_catch_block_node(&mut self, _: &CatchBlockNode) {
    self.push_scope();
  }

  fn exit_catch_block_node(&mut self, _: &CatchBlockNode) {
    self.pop_scope();
  }

  fn enter_class_decl_node(&mut self, node: &ClassDeclNode) {
    let name = &node.stx.name;
    self.declaration_name(&name.stx.name, name.loc);
  }

  fn enter_class_expr_node(&mut self, node: &ClassExprNode) {
    if node.stx.name.is_some() {
      self.push_scope();
    };
  }

  fn exit_class_expr_node(&mut self, node: &ClassExprNode) {
    if node.stx.name.is_some() {
      self.pop_scope();
    };
  }

  fn enter_for_in_of_lhs(&mut self, lhs: &ForInOfLhs) {
    if let ForInOfLhs::Assign(pat) = lhs {
      let mut bindings = Vec::new();
      pat_bindings(pat, &mut bindings);
      for (name, loc) in bindings {
        self.write(&name, loc, true);
      }
    };
  }

  fn enter_for_in_stmt_node(&mut self, _: &ForInStmtNode) {
    self.push_scope();
  }

  fn exit_for_in_stmt_node(&mut self, _: &ForInStmtNode) {
    self.pop_scope();
  }

  fn enter_for_of_stmt_node(&mut self, _: &ForOfStmtNode) {
    self.push_scope();
  }

  fn exit_for_of_stmt_node(&mut self, _: &ForOfStmtNode) {
    self.pop_scope();
  }

  fn enter_for_triple_stmt_node(&mut self, _: &ForTripleStmtNode) {
    self.push_scope();
  }

  fn exit_for_triple_stmt_node(&mut self, _: &ForTripleStmtNode) {
    self.pop_scope();
  }

  fn enter_func_decl_node(&mut self, node: &FuncDeclNode) {
    let name = &node.stx.name;
    self.declaration_name(&name.stx.name, name.loc);
  }

  fn enter_func_node(&mut self, _: &FuncNode) {
    self.push_scope();
  }

  fn exit_func_node(&mut self, _: &FuncNode) {
    self.pop_scope();
  }

  fn enter_id_expr_node(&mut self, node: &IdExprNode) {
    self.read(&node.stx.name, node.loc);
  }

  // Covers declared names and assignment targets. Both are recorded so renames reach them.
  fn enter_id_pat_node(&mut self, node: &IdPatNode) {
    self.read(&node.stx.name, node.loc);
  }

  fn enter_obj_member_node(&mut self, node: &ObjMemberNode) {
    if let ObjMemberType::Shorthand { id } = &node.stx.typ {
      self.shorthands.insert(id.loc);
    };
  }

  fn enter_obj_pat_prop_node(&mut self, node: &ObjPatPropNode) {
    if node.stx.shorthand {
      self.shorthands.insert(node.stx.target.loc);
    };
  }

  fn enter_switch_stmt_node(&mut self, _: &SwitchStmtNode) {
    self.push_scope();
  }

  fn exit_switch_stmt_node(&mut self, _: &SwitchStmtNode) {
    self.pop_scope();
  }

  fn enter_unary_expr_node(&mut self, node: &UnaryExprNode) {
    if matches!(
      node.stx.operator,
      OperatorName::PrefixIncrement | OperatorName::PrefixDecrement
    ) {
      self.write_expr(&node.stx.argument, true);
    };
  }

  fn enter_unary_postfix_expr_node(&mut self, node: &UnaryPostfixExprNode) {
    self.write_expr(&node.stx.argument, true);
  }
}

// Assigns comments to statements and measures the blank lines between statements.
fn attach_comments(
  source: &str,
  body: &[Node<Stmt>],
  comments: &[Comment],
  statements: &mut [StatementInfo],
) {
  let mut next = 0;
  for i in 0..body.len() {
    let start = body[i].loc.0;
    let prev_end = if i > 0 { body[i - 1].loc.1 } else { 0 };
    // Comments inside the previous statement are part of its text.
    while comments.get(next).is_some_and(|c| c.loc.0 < prev_end) {
      next += 1;
    }
    let mut trailing = i > 0;
    while let Some(comment) = comments.get(next) {
      if comment.loc.1 > start {
        break;
      };
      if trailing && !source[prev_end..comment.loc.0].contains('\n') {
        statements[i - 1].trailing_comment = Some(*comment);
      } else {
        statements[i].leading_comments.push(*comment);
      };
      next += 1;
      trailing = false;
    }

    let gap_start = match i {
      0 => 0,
      _ => statements[i - 1]
        .trailing_comment
        .map_or(prev_end, |c| c.loc.1),
    };
    let gap_end = statements[i]
      .leading_comments
      .first()
      .map_or(start, |c| c.loc.0);
    let blank_lines = source[gap_start..gap_end]
      .matches('\n')
      .count()
      .saturating_sub(1);
    if i > 0 {
      statements[i - 1].margin.1 = blank_lines;
    };
    statements[i].margin.0 = blank_lines;
  }

  // A comment on the last statement's line.
  if let Some(last) = body.last() {
    let end = last.loc.1;
    while comments.get(next).is_some_and(|c| c.loc.0 < end) {
      next += 1;
    }
    if let Some(comment) = comments.get(next) {
      if !source[end..comment.loc.0].contains('\n') {
        statements[body.len() - 1].trailing_comment = Some(*comment);
      };
    };
  };
}

pub fn analyse(path: &Path, source: &str, ast: &Node<TopLevel>) -> BundleResult<Analysis> {
  let body = &ast.stx.body;

  let mut record = ModuleRecord::new(path, source);
  let mut statements = Vec::with_capacity(body.len());
  for stmt in body.iter() {
    let kind = record.statement(stmt)?;
    statements.push(StatementInfo {
      loc: stmt.loc,
      kind,
      defines: Vec::new(),
      modifies: Vec::new(),
      depends_on: Vec::new(),
      leading_comments: Vec::new(),
      trailing_comment: None,
      margin: (0, 0),
      references: Vec::new(),
      removable: is_removable(stmt),
    });
  }
  let ModuleRecord {
    imports,
    exports,
    export_order,
    star_exports,
    sources,
    ..
  } = record;

  let mut declare = DeclareVisitor {
    scopes: ScopeTree::new(),
    scope_stack: vec![ScopeTree::ROOT],
    func_expr_name: None,
    defines: Vec::new(),
  };
  for (stmt, info) in body.iter().zip(statements.iter_mut()) {
    if matches!(info.kind, StatementKind::Import { .. }) {
      continue;
    };
    stmt.drive(&mut declare);
    info.defines = std::mem::take(&mut declare.defines);
    if matches!(info.kind, StatementKind::ExportDefaultExpr { .. }) {
      push_unique(&mut info.defines, DEFAULT_SLOT);
    };
  }
  attach_comments(source, body, &ast.stx.comments, &mut statements);

  for exported in export_order.iter() {
    let export = &exports[exported];
    let defined = if export.local == DEFAULT_SLOT {
      statements.iter().any(|s| s.defines.iter().any(|d| d == DEFAULT_SLOT))
    } else {
      imports.contains_key(&export.local) || declare.scopes.contains(ScopeTree::ROOT, &export.local)
    };
    if !defined {
      return Err(BundleError::UnresolvedExport {
        path: path.to_path_buf(),
        name: export.local.clone(),
        location: Location::from_offset(source, export.loc.0),
      });
    };
  }

  let mut usage = UsageVisitor {
    scopes: declare.scopes,
    scope_stack: vec![ScopeTree::ROOT],
    last_scope: 0,
    imports: imports.keys().cloned().collect(),
    defines: Vec::new(),
    depends_on: Vec::new(),
    modifies: Vec::new(),
    references: Vec::new(),
    shorthands: HashSet::new(),
    reassigned_import: None,
  };
  for (stmt, info) in body.iter().zip(statements.iter_mut()) {
    if matches!(info.kind, StatementKind::Import { .. }) {
      continue;
    };
    usage.defines = info.defines.clone();
    stmt.drive(&mut usage);
    if let Some((name, loc)) = usage.reassigned_import.take() {
      return Err(BundleError::IllegalReassignment {
        path: path.to_path_buf(),
        name,
        location: Location::from_offset(source, loc.0),
      });
    };
    info.depends_on = std::mem::take(&mut usage.depends_on);
    info.modifies = std::mem::take(&mut usage.modifies);
    info.references = std::mem::take(&mut usage.references);
    info.references.sort_by_key(|r| r.loc.0);
  }

  let mut definitions = HashMap::new();
  let mut modifications: HashMap<String, Vec<StatementId>> = HashMap::new();
  for (id, info) in statements.iter().enumerate() {
    for name in info.defines.iter() {
      definitions.entry(name.clone()).or_insert(id);
    }
    for name in info.modifies.iter() {
      modifications.entry(name.clone()).or_default().push(id);
    }
  }

  trace!(
    path = %path.display(),
    statements = statements.len(),
    imports = imports.len(),
    exports = exports.len(),
    "analysed module"
  );
  Ok(Analysis {
    scopes: usage.scopes,
    statements,
    imports,
    exports,
    export_order,
    star_exports,
    sources,
    definitions,
    modifications,
  })
}

#[cfg(test)]
mod tests {
  use super::analyse;
  use super::Analysis;
  use crate::error::BundleError;
  use crate::module::ImportedName;
  use crate::module::ReferenceKind;
  use crate::module::StatementKind;
  use parse_js::parse;
  use std::path::Path;

  fn analysed(source: &str) -> Analysis {
    let ast = parse(source).unwrap();
    analyse(Path::new("/m.js"), source, &ast).unwrap()
  }

  fn analyse_err(source: &str) -> BundleError {
    let ast = parse(source).unwrap();
    match analyse(Path::new("/m.js"), source, &ast) {
      Ok(_) => panic!("expected analysis of {source:?} to fail"),
      Err(err) => err,
    }
  }

  #[test]
  fn defines_and_dependencies() {
    let a = analysed(
      "import { x } from './x';\nconst a = x + y;\nfunction f(p) { let q = p; return a + q + z; }\nvar b = a.c, { d, e: [g] } = f();",
    );
    let s = &a.statements;
    assert_eq!(s[1].defines, vec!["a"]);
    assert_eq!(s[1].depends_on, vec!["x", "y"]);
    assert_eq!(s[2].defines, vec!["f"]);
    assert_eq!(s[2].depends_on, vec!["a", "z"]);
    assert_eq!(s[3].defines, vec!["b", "d", "g"]);
    assert_eq!(s[3].depends_on, vec!["a", "f"]);
    assert_eq!(a.definitions["g"], 3);
  }

  #[test]
  fn block_and_hoisted_declarations() {
    let a = analysed("{ let inner = 1; var hoisted = 2; }\nif (x) { function g() {} }\nfor (let i = 0; i < 1; i++) {}");
    assert_eq!(a.statements[0].defines, vec!["hoisted"]);
    assert_eq!(a.statements[1].defines, vec!["g"]);
    assert!(a.statements[2].defines.is_empty());
    assert!(a.statements[2].modifies.is_empty());
    assert_eq!(a.statements[1].depends_on, vec!["x"]);
  }

  #[test]
  fn shadowed_names_are_not_dependencies() {
    let a = analysed(
      "const a = 1;\nfunction f(a) { return a; }\nconst g = function a() { return a; };\ntry {} catch (a) { a; }\nconst h = () => { const a = 2; return a; };",
    );
    for s in &a.statements[1..] {
      assert!(!s.depends_on.contains(&"a".to_string()), "{:?}", s);
    }
  }

  #[test]
  fn writes_are_modifications() {
    let a = analysed(
      "let a = 1, b = {};\na = 2;\nb.c.d = 3;\na++;\nfoo(a, b.c, 1);\n[a, { b }] = pair;\nfunction f() { let a; a = 1; }",
    );
    let s = &a.statements;
    assert_eq!(s[1].modifies, vec!["a"]);
    assert_eq!(s[1].depends_on, vec!["a"]);
    assert_eq!(s[2].modifies, vec!["b"]);
    assert_eq!(s[3].modifies, vec!["a"]);
    assert_eq!(s[4].modifies, vec!["a", "b"]);
    assert_eq!(s[5].modifies, vec!["a", "b"]);
    assert!(s[6].modifies.is_empty());
    assert_eq!(a.modifications["a"], vec![1, 3, 4, 5]);
  }

  #[test]
  fn module_record() {
    let a = analysed(
      "import d, * as ns from 'ext';\nimport { x as y, default as z } from './x';\nexport const c = 1;\nexport function f() {}\nexport default class K {}\nexport { c as e, y };\nexport { q as r } from './q';\nexport * from './all';\nexport * as all from './all2';",
    );
    assert_eq!(a.imports["d"].name, ImportedName::Default);
    assert_eq!(a.imports["ns"].name, ImportedName::Namespace);
    assert_eq!(a.imports["y"].name, ImportedName::Named("x".into()));
    assert_eq!(a.imports["z"].name, ImportedName::Default);
    assert_eq!(a.export_order, vec!["c", "f", "default", "e", "y", "r", "all"]);
    assert_eq!(a.exports["default"].local, "K");
    assert_eq!(a.exports["e"].local, "c");
    assert_eq!(a.exports["r"].local, "./q#q");
    assert_eq!(a.imports["./q#q"].source, "./q");
    assert_eq!(a.imports["./all2#*"].name, ImportedName::Namespace);
    assert_eq!(a.star_exports, vec!["./all"]);
    assert_eq!(a.sources, vec!["ext", "./x", "./q", "./all", "./all2"]);
    assert_eq!(a.statements[2].kind, StatementKind::ExportDecl {
      decl_start: "import d, * as ns from 'ext';\nimport { x as y, default as z } from './x';\nexport "
        .len()
    });
    assert_eq!(a.statements[5].kind, StatementKind::ExportList);
  }

  #[test]
  fn export_default_expression_defines_default_slot() {
    let src = "export default (a, b);";
    let a = analysed(src);
    assert_eq!(a.statements[0].defines, vec!["default"]);
    assert_eq!(a.statements[0].depends_on, vec!["a", "b"]);
    assert_eq!(a.statements[0].kind, StatementKind::ExportDefaultExpr {
      expr_start: src.find('(').unwrap()
    });
  }

  #[test]
  fn bare_imports() {
    let a = analysed("import './polyfill';\nimport {} from './empty';\nimport x from './x';");
    let bare: Vec<_> = a
      .statements
      .iter()
      .map(|s| matches!(s.kind, StatementKind::Import { bare: true, .. }))
      .collect();
    assert_eq!(bare, vec![true, true, false]);
  }

  #[test]
  fn references_include_declarations_and_shorthands() {
    let src = "const a = 1;\nconst o = { a, b: a };\nconst { a: c, d } = o;\nfunction f() { return { a }; }";
    let a = analysed(src);
    let refs: Vec<_> = a.statements[1]
      .references
      .iter()
      .map(|r| (r.name.as_str(), r.kind))
      .collect();
    assert_eq!(refs, vec![
      ("o", ReferenceKind::Plain),
      ("a", ReferenceKind::Shorthand),
      ("a", ReferenceKind::Plain),
    ]);
    let refs: Vec<_> = a.statements[2]
      .references
      .iter()
      .map(|r| (r.name.as_str(), r.kind))
      .collect();
    assert_eq!(refs, vec![
      ("c", ReferenceKind::Plain),
      ("d", ReferenceKind::Shorthand),
      ("o", ReferenceKind::Plain),
    ]);
    let f = &a.statements[3].references;
    assert_eq!(f.len(), 2);
    assert_eq!(&src[f[0].loc.0..f[0].loc.1], "f");
    assert_eq!(f[1].kind, ReferenceKind::Shorthand);
  }

  #[test]
  fn comments_and_margins() {
    let src = "// header\nconst a = 1; // about a\n\n\n/* b */\nconst b = 2; /* one */ /* two */\nconst c = 3; // last";
    let a = analysed(src);
    let s = &a.statements;
    let text = |c: &parse_js::lex::Comment| &src[c.loc.0..c.loc.1];
    assert_eq!(s[0].leading_comments.iter().map(text).collect::<Vec<_>>(), vec!["// header"]);
    assert_eq!(s[0].trailing_comment.as_ref().map(text), Some("// about a"));
    assert_eq!(s[1].leading_comments.iter().map(text).collect::<Vec<_>>(), vec!["/* b */"]);
    assert_eq!(s[1].trailing_comment.as_ref().map(text), Some("/* one */"));
    assert_eq!(s[2].leading_comments.iter().map(text).collect::<Vec<_>>(), vec!["/* two */"]);
    assert_eq!(s[2].trailing_comment.as_ref().map(text), Some("// last"));
    assert_eq!(s[0].margin, (0, 2));
    assert_eq!(s[1].margin, (2, 0));
    assert_eq!(s[2].margin, (0, 0));
  }

  #[test]
  fn comments_inside_statements_stay_there() {
    let src = "function f() {\n  // inside\n}\nconst a = 1;";
    let a = analysed(src);
    assert!(a.statements[1].leading_comments.is_empty());
    assert!(a.statements[0].trailing_comment.is_none());
  }

  #[test]
  fn duplicate_import() {
    let err = analyse_err("import a from './a';\nimport { b as a } from './b';");
    match err {
      BundleError::DuplicateImport { name, location, .. } => {
        assert_eq!(name, "a");
        assert_eq!((location.line, location.column), (2, 15));
      }
      other => panic!("unexpected error {other}"),
    }
  }

  #[test]
  fn illegal_reassignment() {
    for src in [
      "import { a } from './a';\na = 1;",
      "import a from './a';\na++;",
      "import * as a from './a';\nfunction f() { a = 2; }",
      "import { a } from './a';\n[a] = [1];",
      "import { a } from './a';\na.b = 2;",
      "import * as a from './a';\na.x = 2;",
      "import * as a from './a';\nfunction f() { a['y']++; }",
    ] {
      match analyse_err(src) {
        BundleError::IllegalReassignment { name, .. } => assert_eq!(name, "a"),
        other => panic!("unexpected error {other}"),
      }
    }
    // Shadowed, or only passed along.
    analysed("import { a } from './a';\nfunction f(a) { a = 1; a.b = 2; }\nfoo(a);");
  }

  #[test]
  fn unresolved_export() {
    match analyse_err("const a = 1;\nexport { a, b };") {
      BundleError::UnresolvedExport { name, location, .. } => {
        assert_eq!(name, "b");
        assert_eq!((location.line, location.column), (2, 13));
      }
      other => panic!("unexpected error {other}"),
    }
    analysed("import { b } from './b';\nfunction c() {}\nexport { b, c };");
  }
}
