use crate::ast::class_or_object::ClassOrObjKey;
use crate::ast::class_or_object::ClassOrObjMemberDirectKey;
use crate::ast::class_or_object::ClassOrObjVal;
use crate::ast::class_or_object::ObjMember;
use crate::ast::class_or_object::ObjMemberType;
use crate::ast::expr::lit::LitArrElem;
use crate::ast::expr::lit::LitArrExpr;
use crate::ast::expr::lit::LitObjExpr;
use crate::ast::expr::pat::ArrPat;
use crate::ast::expr::pat::ArrPatElem;
use crate::ast::expr::pat::IdPat;
use crate::ast::expr::pat::ObjPat;
use crate::ast::expr::pat::ObjPatProp;
use crate::ast::expr::pat::Pat;
use crate::ast::expr::BinaryExpr;
use crate::ast::expr::Expr;
use crate::ast::node::Node;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::operator::OperatorName;
use crate::token::TT;

// Splits `target = default` as parsed inside a literal.
fn target_with_default(elem: Node<Expr>) -> SyntaxResult<(Node<Pat>, Option<Node<Expr>>)> {
  let loc = elem.loc;
  match *elem.stx {
    Expr::Binary(n) => {
      let BinaryExpr {
        operator,
        left,
        right,
      } = *n.stx;
      if operator != OperatorName::Assignment {
        return Err(loc.error(SyntaxErrorType::InvalidAssigmentTarget, None));
      };
      Ok((lit_to_pat(left)?, Some(right)))
    }
    stx => Ok((lit_to_pat(Node::new(loc, stx))?, None)),
  }
}

/// Converts a literal expression subtree into a pattern (assignment target).
/// `{ a: [b] }` could be an object literal or object pattern. This is used when a pattern was
/// parsed as a literal expression, without needing to rewind and reparse.
pub fn lit_to_pat(node: Node<Expr>) -> SyntaxResult<Node<Pat>> {
  let loc = node.loc;
  match *node.stx {
    Expr::LitArr(n) => {
      let LitArrExpr { elements } = *n.stx;
      let mut pat_elements = Vec::<Option<ArrPatElem>>::new();
      let mut rest = None;
      for element in elements {
        if rest.is_some() {
          return Err(loc.error(SyntaxErrorType::InvalidAssigmentTarget, None));
        };
        match element {
          LitArrElem::Single(elem) => {
            let (target, default_value) = target_with_default(elem)?;
            pat_elements.push(Some(ArrPatElem {
              target,
              default_value,
            }));
          }
          LitArrElem::Rest(expr) => rest = Some(lit_to_pat(expr)?),
          LitArrElem::Empty => pat_elements.push(None),
        };
      }
      Ok(
        Node::new(loc, ArrPat {
          elements: pat_elements,
          rest,
        })
        .into_wrapped(),
      )
    }
    Expr::LitObj(n) => {
      let LitObjExpr { members } = *n.stx;
      let mut properties = Vec::new();
      let mut rest: Option<Node<IdPat>> = None;
      for member in members {
        let loc = member.loc;
        if rest.is_some() {
          return Err(loc.error(SyntaxErrorType::InvalidAssigmentTarget, None));
        };
        let ObjMember { typ } = *member.stx;
        match typ {
          ObjMemberType::Valued { key, val } => {
            let ClassOrObjVal::Prop(Some(initializer)) = val else {
              return Err(loc.error(SyntaxErrorType::InvalidAssigmentTarget, None));
            };
            let (target, default_value) = target_with_default(initializer)?;
            // `{ a = 1 }` keeps its key and target at the same location.
            let shorthand = matches!(&key, ClassOrObjKey::Direct(k) if k.loc == target.loc);
            properties.push(Node::new(loc, ObjPatProp {
              key,
              target,
              shorthand,
              default_value,
            }));
          }
          ObjMemberType::Shorthand { id } => {
            let name = id.stx.name.clone();
            let key = Node::new(id.loc, ClassOrObjMemberDirectKey {
              key: name.clone(),
              tt: TT::Identifier,
            });
            properties.push(Node::new(loc, ObjPatProp {
              key: ClassOrObjKey::Direct(key),
              target: Node::new(id.loc, IdPat { name }).into_wrapped(),
              shorthand: true,
              default_value: None,
            }));
          }
          ObjMemberType::Rest { val } => {
            let maybe_rest = lit_to_pat(val)?;
            // The rest element must be an identifier.
            let rest_loc = maybe_rest.loc;
            let Pat::Id(rest_pat) = *maybe_rest.stx else {
              return Err(rest_loc.error(SyntaxErrorType::InvalidAssigmentTarget, None));
            };
            rest = Some(rest_pat);
          }
        };
      }
      Ok(Node::new(loc, ObjPat { properties, rest }).into_wrapped())
    }
    Expr::Id(n) => Ok(
      Node::new(loc, IdPat {
        name: n.stx.name.clone(),
      })
      .into_wrapped(),
    ),
    // `{ a: b = 1 } = x` parses `b = 1` as an assignment first, so its target is already an IdPat.
    Expr::IdPat(n) => Ok(n.into_wrapped()),
    Expr::ArrPat(n) => Ok(n.into_wrapped()),
    Expr::ObjPat(n) => Ok(n.into_wrapped()),
    _ => Err(loc.error(SyntaxErrorType::InvalidAssigmentTarget, None)),
  }
}

// Checking every operand for being a possible assignment target up front is wasteful, so the LHS
// of a BinaryExpr with an Assignment* operator is transformed afterwards. A valid target is:
// - A chain of non-optional-chaining member, computed member, and call operators, not ending in a call.
// - A pattern, but only for plain `=`.
pub fn lhs_expr_to_assign_target(
  lhs: Node<Expr>,
  operator_name: OperatorName,
) -> SyntaxResult<Node<Expr>> {
  match lhs.stx.as_ref() {
    e @ (Expr::LitArr(_) | Expr::LitObj(_) | Expr::Id(_)) => {
      if operator_name != OperatorName::Assignment && !matches!(e, Expr::Id(_)) {
        return Err(lhs.error(SyntaxErrorType::InvalidAssigmentTarget));
      }
      Ok(lit_to_pat(lhs)?.into_stx())
    }
    Expr::ComputedMember(m) if !m.stx.optional_chaining => Ok(lhs),
    Expr::Member(m) if !m.stx.optional_chaining => Ok(lhs),
    _ => Err(lhs.error(SyntaxErrorType::InvalidAssigmentTarget)),
  }
}
