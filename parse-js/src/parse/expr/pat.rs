use super::super::ParseCtx;
use super::super::Parser;
use crate::ast::class_or_object::ClassOrObjKey;
use crate::ast::expr::pat::ArrPat;
use crate::ast::expr::pat::ArrPatElem;
use crate::ast::expr::pat::ClassOrFuncName;
use crate::ast::expr::pat::IdPat;
use crate::ast::expr::pat::ObjPat;
use crate::ast::expr::pat::ObjPatProp;
use crate::ast::expr::pat::Pat;
use crate::ast::node::Node;
use crate::ast::stmt::decl::PatDecl;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::token::TT;
use crate::token::UNRESERVED_KEYWORDS;

#[derive(Clone, Copy)]
pub struct ParsePatternRules {
  // Whether `await` can be used as an identifier rather than an operator.
  pub await_allowed: bool,
  // Whether `yield` can be used as an identifier rather than an operator.
  pub yield_allowed: bool,
}

pub fn is_valid_pattern_identifier(typ: TT, rules: ParsePatternRules) -> bool {
  match typ {
    TT::Identifier => true,
    TT::KeywordAwait => rules.await_allowed,
    TT::KeywordYield => rules.yield_allowed,
    t => UNRESERVED_KEYWORDS.contains(&t),
  }
}

impl<'a> Parser<'a> {
  pub fn maybe_class_or_func_name(&mut self, ctx: ParseCtx) -> Option<Node<ClassOrFuncName>> {
    self
      .consume_if_pred(|t| is_valid_pattern_identifier(t.typ, ctx.rules))
      .match_loc()
      .map(|loc| {
        Node::new(loc, ClassOrFuncName {
          name: self.string(loc),
        })
      })
  }

  pub fn class_or_func_name(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ClassOrFuncName>> {
    let t = self.peek();
    self
      .maybe_class_or_func_name(ctx)
      .ok_or_else(|| t.error(SyntaxErrorType::ExpectedSyntax("name")))
  }

  pub fn id_pat(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<IdPat>> {
    self.with_loc(|p| {
      let t = p.consume();
      if !is_valid_pattern_identifier(t.typ, ctx.rules) {
        return Err(t.error(SyntaxErrorType::ExpectedSyntax("identifier")));
      }
      Ok(IdPat {
        name: p.string(t.loc),
      })
    })
  }

  /// Parses an object pattern like `{ x, y: z, [computed]: value, ...rest }`.
  pub fn obj_pat(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ObjPat>> {
    self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let mut properties = Vec::new();
      let mut rest = None;
      while p.peek().typ != TT::BraceClose {
        // The rest element must be last, with no trailing comma.
        if p.consume_if(TT::DotDotDot).is_match() {
          rest = Some(p.id_pat(ctx)?);
          break;
        };
        let prop = p.with_loc(|p| {
          let key = p.class_or_obj_key(ctx)?;
          let (shorthand, target) = if p.consume_if(TT::Colon).is_match() {
            (false, p.pat(ctx)?)
          } else {
            // A shorthand key must be a plain identifier.
            let ClassOrObjKey::Direct(n) = &key else {
              return Err(p.peek().error(SyntaxErrorType::RequiredTokenNotFound(TT::Colon)));
            };
            if !is_valid_pattern_identifier(n.stx.tt, ctx.rules) {
              return Err(n.error(SyntaxErrorType::ExpectedSyntax("identifier")));
            };
            let target = Node::new(n.loc, IdPat {
              name: n.stx.key.clone(),
            })
            .into_wrapped();
            (true, target)
          };
          let default_value = p
            .consume_if(TT::Equals)
            .and_then(|| p.expr(ctx, [TT::Comma, TT::BraceClose]))?;
          Ok(ObjPatProp {
            key,
            target,
            shorthand,
            default_value,
          })
        })?;
        properties.push(prop);
        if !p.consume_if(TT::Comma).is_match() {
          break;
        };
      }
      p.require(TT::BraceClose)?;
      Ok(ObjPat { properties, rest })
    })
  }

  /// Parses an array pattern like `[a, , b = c, ...rest]`.
  pub fn arr_pat(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ArrPat>> {
    self.with_loc(|p| {
      p.require(TT::BracketOpen)?;
      let mut elements = Vec::<Option<ArrPatElem>>::new();
      let mut rest = None;
      while p.peek().typ != TT::BracketClose {
        if p.consume_if(TT::DotDotDot).is_match() {
          rest = Some(p.pat(ctx)?);
          break;
        };
        // A hole skips that element.
        if p.consume_if(TT::Comma).is_match() {
          elements.push(None);
          continue;
        };
        let target = p.pat(ctx)?;
        let default_value = p
          .consume_if(TT::Equals)
          .and_then(|| p.expr(ctx, [TT::Comma, TT::BracketClose]))?;
        elements.push(Some(ArrPatElem {
          target,
          default_value,
        }));
        if !p.consume_if(TT::Comma).is_match() {
          break;
        };
      }
      p.require(TT::BracketClose)?;
      Ok(ArrPat { elements, rest })
    })
  }

  pub fn pat(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Pat>> {
    let t = self.peek();
    let pat: Node<Pat> = match t.typ {
      TT::BraceOpen => self.obj_pat(ctx)?.into_wrapped(),
      TT::BracketOpen => self.arr_pat(ctx)?.into_wrapped(),
      typ if is_valid_pattern_identifier(typ, ctx.rules) => self.id_pat(ctx)?.into_wrapped(),
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("pattern"))),
    };
    Ok(pat)
  }

  pub fn pat_decl(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<PatDecl>> {
    let pat = self.pat(ctx)?;
    Ok(pat.wrap(|pat| PatDecl { pat }))
  }

  pub fn id_pat_decl(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<PatDecl>> {
    let id = self.id_pat(ctx)?;
    Ok(id.into_wrapped::<Pat>().wrap(|pat| PatDecl { pat }))
  }
}
