pub mod decl;

use super::expr::pat::Pat;
use super::expr::Expr;
use super::import_export::ExportNames;
use super::import_export::ImportNames;
use super::node::Node;
use decl::ClassDecl;
use decl::FuncDecl;
use decl::PatDecl;
use decl::VarDecl;
use decl::VarDeclMode;
use derive_more::derive::From;
use derive_more::derive::TryInto;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

// Each variant wraps a Node<T> so visitors can target Node<T> rather than just T.
#[derive(Debug, Drive, DriveMut, From, Serialize, TryInto)]
#[serde(tag = "$t")]
pub enum Stmt {
  Block(Node<BlockStmt>),
  Break(Node<BreakStmt>),
  Continue(Node<ContinueStmt>),
  Debugger(Node<DebuggerStmt>),
  DoWhile(Node<DoWhileStmt>),
  Empty(Node<EmptyStmt>),
  ExportDefaultExpr(Node<ExportDefaultExprStmt>),
  ExportList(Node<ExportListStmt>),
  Expr(Node<ExprStmt>),
  ForIn(Node<ForInStmt>),
  ForOf(Node<ForOfStmt>),
  ForTriple(Node<ForTripleStmt>),
  If(Node<IfStmt>),
  Import(Node<ImportStmt>),
  Label(Node<LabelStmt>),
  Return(Node<ReturnStmt>),
  Switch(Node<SwitchStmt>),
  Throw(Node<ThrowStmt>),
  Try(Node<TryStmt>),
  While(Node<WhileStmt>),
  With(Node<WithStmt>),

  // For exported declarations, the outer Node<Stmt> covers the `export` keyword while the
  // declaration's own node starts at the declaration keyword.
  ClassDecl(Node<ClassDecl>),
  FunctionDecl(Node<FuncDecl>),
  VarDecl(Node<VarDecl>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct CatchBlock {
  pub parameter: Option<Node<PatDecl>>,
  // Not a BlockStmt: the scope starts at the parameter, not the braces.
  pub body: Vec<Node<Stmt>>,
}

// The scope of a `for` statement starts at its header, so this is distinct from BlockStmt.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ForBody {
  pub body: Vec<Node<Stmt>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SwitchBranch {
  // None for `default`.
  pub case: Option<Node<Expr>>,
  pub body: Vec<Node<Stmt>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct BlockStmt {
  pub body: Vec<Node<Stmt>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct BreakStmt {
  #[drive(skip)]
  pub label: Option<String>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ContinueStmt {
  #[drive(skip)]
  pub label: Option<String>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct DebuggerStmt {}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct DoWhileStmt {
  pub condition: Node<Expr>,
  pub body: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct EmptyStmt {}

// `export default <expr>`. Anonymous function and class declarations are also parsed as this.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExportDefaultExprStmt {
  pub expression: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExportListStmt {
  pub names: ExportNames,
  #[drive(skip)]
  pub from: Option<String>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExprStmt {
  pub expr: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct IfStmt {
  pub test: Node<Expr>,
  pub consequent: Node<Stmt>,
  pub alternate: Option<Node<Stmt>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ImportStmt {
  // Always an IdPat.
  pub default: Option<Node<PatDecl>>,
  pub names: Option<ImportNames>,
  #[drive(skip)]
  pub module: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ForTripleStmt {
  pub init: ForTripleStmtInit,
  pub cond: Option<Node<Expr>>,
  pub post: Option<Node<Expr>>,
  pub body: Node<ForBody>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum ForTripleStmtInit {
  None,
  Expr(Node<Expr>),
  Decl(Node<VarDecl>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum ForInOfLhs {
  // Assignment target.
  Assign(Node<Pat>),
  // Scoped variable declaration.
  Decl {
    mode: VarDeclMode,
    pattern: Node<PatDecl>,
  },
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ForInStmt {
  pub lhs: ForInOfLhs,
  pub rhs: Node<Expr>,
  pub body: Node<ForBody>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ForOfStmt {
  #[drive(skip)]
  pub await_: bool,
  pub lhs: ForInOfLhs,
  pub rhs: Node<Expr>,
  pub body: Node<ForBody>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LabelStmt {
  #[drive(skip)]
  pub name: String,
  pub statement: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ReturnStmt {
  pub value: Option<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SwitchStmt {
  pub test: Node<Expr>,
  pub branches: Vec<Node<SwitchBranch>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ThrowStmt {
  pub value: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TryStmt {
  pub wrapped: Node<BlockStmt>,
  // At least one of these is present.
  pub catch: Option<Node<CatchBlock>>,
  pub finally: Option<Node<BlockStmt>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct WhileStmt {
  pub condition: Node<Expr>,
  pub body: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct WithStmt {
  pub object: Node<Expr>,
  pub body: Node<Stmt>,
}
