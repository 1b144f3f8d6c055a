pub mod lit;
pub mod pat;

use super::class_or_object::ClassMember;
use super::func::Func;
use super::node::Node;
use crate::operator::OperatorName;
use derive_more::derive::From;
use derive_more::derive::TryInto;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use lit::LitArrExpr;
use lit::LitBigIntExpr;
use lit::LitBoolExpr;
use lit::LitNullExpr;
use lit::LitNumExpr;
use lit::LitObjExpr;
use lit::LitRegexExpr;
use lit::LitStrExpr;
use lit::LitTemplateExpr;
use lit::LitTemplatePart;
use pat::ArrPat;
use pat::ClassOrFuncName;
use pat::IdPat;
use pat::ObjPat;
use serde::Serialize;

// Each variant wraps a Node<T> so visitors can target Node<T> rather than just T.
#[derive(Debug, Drive, DriveMut, From, Serialize, TryInto)]
#[serde(tag = "$t")]
pub enum Expr {
  ArrowFunc(Node<ArrowFuncExpr>),
  Binary(Node<BinaryExpr>),
  Call(Node<CallExpr>),
  Class(Node<ClassExpr>),
  ComputedMember(Node<ComputedMemberExpr>),
  Cond(Node<CondExpr>),
  Func(Node<FuncExpr>),
  Id(Node<IdExpr>),
  Import(Node<ImportExpr>),
  ImportMeta(Node<ImportMeta>),
  Member(Node<MemberExpr>),
  NewTarget(Node<NewTarget>),
  Super(Node<SuperExpr>),
  TaggedTemplate(Node<TaggedTemplateExpr>),
  This(Node<ThisExpr>),
  Unary(Node<UnaryExpr>),
  UnaryPostfix(Node<UnaryPostfixExpr>),

  // Literals.
  LitArr(Node<LitArrExpr>),
  LitBigInt(Node<LitBigIntExpr>),
  LitBool(Node<LitBoolExpr>),
  LitNull(Node<LitNullExpr>),
  LitNum(Node<LitNumExpr>),
  LitObj(Node<LitObjExpr>),
  LitRegex(Node<LitRegexExpr>),
  LitStr(Node<LitStrExpr>),
  LitTemplate(Node<LitTemplateExpr>),

  // Assignment targets. Only appear as the left operand of an assignment.
  ArrPat(Node<ArrPat>),
  IdPat(Node<IdPat>),
  ObjPat(Node<ObjPat>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct CallArg {
  #[drive(skip)]
  pub spread: bool,
  pub value: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ArrowFuncExpr {
  pub func: Node<Func>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct BinaryExpr {
  #[drive(skip)]
  pub operator: OperatorName,
  pub left: Node<Expr>,
  pub right: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct CallExpr {
  #[drive(skip)]
  pub optional_chaining: bool,
  pub callee: Node<Expr>,
  pub arguments: Vec<Node<CallArg>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassExpr {
  pub name: Option<Node<ClassOrFuncName>>,
  pub extends: Option<Node<Expr>>,
  pub members: Vec<Node<ClassMember>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct CondExpr {
  pub test: Node<Expr>,
  pub consequent: Node<Expr>,
  pub alternate: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ComputedMemberExpr {
  #[drive(skip)]
  pub optional_chaining: bool,
  pub object: Node<Expr>,
  pub member: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct FuncExpr {
  pub name: Option<Node<ClassOrFuncName>>,
  pub func: Node<Func>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct IdExpr {
  #[drive(skip)]
  pub name: String,
}

// Dynamic `import(...)`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ImportExpr {
  pub module: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ImportMeta {}

// The property is a plain string; it is never a variable usage.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct MemberExpr {
  #[drive(skip)]
  pub optional_chaining: bool,
  pub left: Node<Expr>,
  #[drive(skip)]
  pub right: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct NewTarget {}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SuperExpr {}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ThisExpr {}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TaggedTemplateExpr {
  pub function: Node<Expr>,
  pub parts: Vec<LitTemplatePart>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct UnaryExpr {
  #[drive(skip)]
  pub operator: OperatorName,
  pub argument: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct UnaryPostfixExpr {
  #[drive(skip)]
  pub operator: OperatorName,
  pub argument: Node<Expr>,
}
