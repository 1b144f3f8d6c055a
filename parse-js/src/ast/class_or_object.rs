use super::expr::Expr;
use super::expr::IdExpr;
use super::func::Func;
use super::node::Node;
use crate::token::TT;
use derive_more::derive::From;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

/// The key may differ from `source[node.loc]` as string keys are decoded.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassOrObjMemberDirectKey {
  #[drive(skip)]
  pub key: String,
  #[drive(skip)]
  pub tt: TT,
}

// Direct keys are never variable usages, so this cannot be represented with IdExpr.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum ClassOrObjKey {
  // Identifier, keyword, string, or number.
  Direct(Node<ClassOrObjMemberDirectKey>),
  Computed(Node<Expr>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassOrObjGetter {
  pub func: Node<Func>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassOrObjMethod {
  pub func: Node<Func>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassOrObjSetter {
  pub func: Node<Func>,
}

#[derive(Debug, Drive, DriveMut, From, Serialize)]
pub enum ClassOrObjVal {
  Getter(Node<ClassOrObjGetter>),
  Setter(Node<ClassOrObjSetter>),
  Method(Node<ClassOrObjMethod>),
  // Always Some for objects. None for a class field without initialiser.
  Prop(Option<Node<Expr>>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum ObjMemberType {
  Valued {
    key: ClassOrObjKey,
    val: ClassOrObjVal,
  },
  Shorthand {
    id: Node<IdExpr>,
  },
  Rest {
    val: Node<Expr>,
  },
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassMember {
  pub key: ClassOrObjKey,
  #[drive(skip)]
  pub static_: bool,
  pub val: ClassOrObjVal,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ObjMember {
  pub typ: ObjMemberType,
}
