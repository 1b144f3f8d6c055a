use super::Expr;
use crate::ast::class_or_object::ClassOrObjKey;
use crate::ast::node::Node;
use derive_more::derive::From;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

#[derive(Debug, Drive, DriveMut, From, Serialize)]
#[serde(tag = "$t")]
pub enum Pat {
  Arr(Node<ArrPat>),
  Id(Node<IdPat>),
  Obj(Node<ObjPat>),
}

impl From<Pat> for Expr {
  fn from(value: Pat) -> Self {
    match value {
      Pat::Arr(arr) => Expr::ArrPat(arr),
      Pat::Id(id) => Expr::IdPat(id),
      Pat::Obj(obj) => Expr::ObjPat(obj),
    }
  }
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ArrPatElem {
  pub target: Node<Pat>,
  pub default_value: Option<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ArrPat {
  // None for holes, e.g. `[, b]`.
  pub elements: Vec<Option<ArrPatElem>>,
  pub rest: Option<Node<Pat>>,
}

// The name of a function or class declaration or expression.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassOrFuncName {
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct IdPat {
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ObjPat {
  pub properties: Vec<Node<ObjPatProp>>,
  pub rest: Option<Node<IdPat>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ObjPatProp {
  pub key: ClassOrObjKey,
  // For a shorthand, this is an IdPat with the key's name and location, so there is always a
  // target to visit.
  pub target: Node<Pat>,
  #[drive(skip)]
  pub shorthand: bool,
  pub default_value: Option<Node<Expr>>,
}
