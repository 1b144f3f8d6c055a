use super::expr::Asi;
use super::ParseCtx;
use super::Parser;
use crate::ast::class_or_object::ClassMember;
use crate::ast::class_or_object::ClassOrObjGetter;
use crate::ast::class_or_object::ClassOrObjKey;
use crate::ast::class_or_object::ClassOrObjMemberDirectKey;
use crate::ast::class_or_object::ClassOrObjMethod;
use crate::ast::class_or_object::ClassOrObjSetter;
use crate::ast::class_or_object::ClassOrObjVal;
use crate::ast::func::Func;
use crate::ast::node::Node;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::KEYWORDS_MAPPING;
use crate::token::Token;
use crate::token::TT;

// Whether a token directly after `async`, `get`, `set`, or `static` means that word is itself the
// member's key rather than a modifier.
fn ends_member_key(t: &Token) -> bool {
  matches!(
    t.typ,
    TT::ParenthesisOpen
      | TT::Equals
      | TT::Colon
      | TT::Comma
      | TT::Semicolon
      | TT::BraceClose
      | TT::EOF
  )
}

impl<'a> Parser<'a> {
  pub fn class_body(&mut self, ctx: ParseCtx) -> SyntaxResult<Vec<Node<ClassMember>>> {
    self.require(TT::BraceOpen)?;
    let mut members = Vec::new();
    loop {
      // Stray semicolons between members are allowed.
      while self.consume_if(TT::Semicolon).is_match() {}
      if self.peek().typ == TT::BraceClose {
        break;
      };
      let member = self.with_loc(|p| {
        // `static` must always come first if present.
        let [a, b] = p.peek_n::<2>();
        let static_ = a.typ == TT::KeywordStatic && !ends_member_key(&b);
        if static_ {
          p.consume();
        };
        let (key, val) = p.class_or_obj_member(ctx, TT::Equals, TT::Semicolon, &mut Asi::can())?;
        p.consume_if(TT::Semicolon);
        Ok(ClassMember { key, static_, val })
      })?;
      members.push(member);
    }
    self.require(TT::BraceClose)?;
    Ok(members)
  }

  /// Parses a class or object key like `a`, `'a'`, `#a`, `"a"`, `1`, `[1]`.
  pub fn class_or_obj_key(&mut self, ctx: ParseCtx) -> SyntaxResult<ClassOrObjKey> {
    if self.consume_if(TT::BracketOpen).is_match() {
      let key = self.expr(ctx, [TT::BracketClose])?;
      self.require(TT::BracketClose)?;
      return Ok(ClassOrObjKey::Computed(key));
    };
    let key = self.with_loc(|p| {
      let t = p.peek();
      let key = match t.typ {
        TT::LiteralString => p.lit_str_val()?,
        TT::LiteralNumber => p.lit_num_val()?.to_string(),
        // There's no trailing `n`.
        TT::LiteralBigInt => p.lit_bigint_val()?,
        TT::PrivateMember | TT::Identifier => p.consume_as_string(),
        TT::LiteralTrue | TT::LiteralFalse | TT::LiteralNull => p.consume_as_string(),
        // Any keyword is allowed as a key.
        t if KEYWORDS_MAPPING.contains_key(&t) => p.consume_as_string(),
        _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("keyword or identifier"))),
      };
      Ok(ClassOrObjMemberDirectKey { key, tt: t.typ })
    })?;
    Ok(ClassOrObjKey::Direct(key))
  }

  fn class_or_obj_method_func(
    &mut self,
    ctx: ParseCtx,
    async_: bool,
    generator: bool,
  ) -> SyntaxResult<Node<Func>> {
    self.with_loc(|p| {
      let parameters = p.func_params(ctx)?;
      let body = p.parse_func_block_body(ctx)?.into();
      Ok(Func {
        arrow: false,
        async_,
        generator,
        parameters,
        body,
      })
    })
  }

  // It's strictly one of these:
  // - <key> [ <value_delimiter> <expr> ]? [ <asi> | <statement_delimiter> ]
  // - async? '*'? <key> '(' ...
  // - [ get | set ] <key> '(' ...
  // where <key> = <ident> | <keyword> | <str> | <num> | '[' <expr> ']'
  pub fn class_or_obj_member(
    &mut self,
    ctx: ParseCtx,
    value_delimiter: TT,
    statement_delimiter: TT,
    property_initialiser_asi: &mut Asi,
  ) -> SyntaxResult<(ClassOrObjKey, ClassOrObjVal)> {
    let [a, b] = self.peek_n::<2>();
    match a.typ {
      TT::KeywordGet | TT::KeywordSet if !ends_member_key(&b) => {
        self.consume();
        let key = self.class_or_obj_key(ctx)?;
        let func = self.class_or_obj_method_func(ctx, false, false)?;
        let val: ClassOrObjVal = if a.typ == TT::KeywordGet {
          func.wrap(|func| ClassOrObjGetter { func }).into()
        } else {
          func.wrap(|func| ClassOrObjSetter { func }).into()
        };
        return Ok((key, val));
      }
      TT::KeywordAsync if !ends_member_key(&b) && !b.preceded_by_line_terminator => {
        self.consume();
        let generator = self.consume_if(TT::Asterisk).is_match();
        let key = self.class_or_obj_key(ctx)?;
        let func = self.class_or_obj_method_func(ctx, true, generator)?;
        return Ok((key, func.wrap(|func| ClassOrObjMethod { func }).into()));
      }
      TT::Asterisk => {
        self.consume();
        let key = self.class_or_obj_key(ctx)?;
        let func = self.class_or_obj_method_func(ctx, false, true)?;
        return Ok((key, func.wrap(|func| ClassOrObjMethod { func }).into()));
      }
      _ => {}
    };

    let key = self.class_or_obj_key(ctx)?;
    if self.peek().typ == TT::ParenthesisOpen {
      let func = self.class_or_obj_method_func(ctx, false, false)?;
      return Ok((key, func.wrap(|func| ClassOrObjMethod { func }).into()));
    };
    let initializer = self
      .consume_if(value_delimiter)
      .and_then(|| {
        self.expr_with_asi(
          ctx,
          [statement_delimiter, TT::BraceClose],
          property_initialiser_asi,
        )
      })?;
    Ok((key, ClassOrObjVal::Prop(initializer)))
  }
}
