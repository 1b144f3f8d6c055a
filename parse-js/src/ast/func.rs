use super::expr::Expr;
use super::node::Node;
use super::stmt::decl::ParamDecl;
use super::stmt::Stmt;
use derive_more::derive::From;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

// Shared by function declarations and expressions, arrow functions, and methods.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct Func {
  #[drive(skip)]
  pub arrow: bool,
  #[drive(skip)]
  pub async_: bool,
  #[drive(skip)]
  pub generator: bool,
  pub parameters: Vec<Node<ParamDecl>>,
  pub body: FuncBody,
}

// Not a BlockStmt: the function scope starts at the parameters, not the braces.
#[derive(Debug, Drive, DriveMut, From, Serialize)]
pub enum FuncBody {
  Block(Vec<Node<Stmt>>),
  // Concise arrow function body.
  Expression(Node<Expr>),
}
