use super::ParseCtx;
use super::Parser;
use crate::ast::class_or_object::ClassOrObjKey;
use crate::ast::class_or_object::ClassOrObjMemberDirectKey;
use crate::ast::class_or_object::ClassOrObjVal;
use crate::ast::class_or_object::ObjMember;
use crate::ast::class_or_object::ObjMemberType;
use crate::ast::expr::lit::LitArrElem;
use crate::ast::expr::lit::LitArrExpr;
use crate::ast::expr::lit::LitBigIntExpr;
use crate::ast::expr::lit::LitBoolExpr;
use crate::ast::expr::lit::LitNullExpr;
use crate::ast::expr::lit::LitNumExpr;
use crate::ast::expr::lit::LitObjExpr;
use crate::ast::expr::lit::LitRegexExpr;
use crate::ast::expr::lit::LitStrExpr;
use crate::ast::expr::lit::LitTemplateExpr;
use crate::ast::expr::lit::LitTemplatePart;
use crate::ast::expr::BinaryExpr;
use crate::ast::expr::IdExpr;
use crate::ast::node::Node;
use crate::char::is_line_terminator;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::LexMode;
use crate::loc::Loc;
use crate::num::JsNumber;
use crate::operator::OperatorName;
use crate::token::TT;
use std::iter::Peekable;
use std::str::CharIndices;

fn take_hex(chars: &mut Peekable<CharIndices>, n: usize) -> Option<u32> {
  let mut value = 0;
  for _ in 0..n {
    let (_, c) = chars.next()?;
    value = (value << 4) | c.to_digit(16)?;
  }
  Some(value)
}

fn take_unicode_escape(chars: &mut Peekable<CharIndices>) -> Option<u32> {
  if chars.next_if(|(_, c)| *c == '{').is_none() {
    return take_hex(chars, 4);
  };
  let mut value: u32 = 0;
  let mut digits = 0;
  loop {
    let (_, c) = chars.next()?;
    if c == '}' {
      break;
    };
    value = value.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
    digits += 1;
  }
  (digits > 0 && value <= 0x10ffff).then_some(value)
}

/// Decodes escape sequences in the body of a string or template literal. On failure, returns the
/// byte offset of the offending backslash.
pub fn decode_literal(raw: &str, allow_line_terminators: bool) -> Result<String, usize> {
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.char_indices().peekable();
  while let Some((i, c)) = chars.next() {
    if c != '\\' {
      if !allow_line_terminators && (c == '\n' || c == '\r') {
        return Err(i);
      };
      out.push(c);
      continue;
    };
    let Some((_, e)) = chars.next() else {
      return Err(i);
    };
    match e {
      // Line continuation.
      '\r' => {
        chars.next_if(|(_, c)| *c == '\n');
      }
      e if is_line_terminator(e) => {}
      'b' => out.push('\x08'),
      'f' => out.push('\x0c'),
      'n' => out.push('\n'),
      'r' => out.push('\r'),
      't' => out.push('\t'),
      'v' => out.push('\x0b'),
      // Legacy octal escapes, up to \377.
      '0'..='7' => {
        let mut value = e as u32 - '0' as u32;
        let max_digits = if e <= '3' { 3 } else { 2 };
        for _ in 1..max_digits {
          match chars.next_if(|(_, c)| ('0'..='7').contains(c)) {
            Some((_, d)) => value = value * 8 + (d as u32 - '0' as u32),
            None => break,
          };
        }
        out.push(char::from_u32(value).ok_or(i)?);
      }
      'x' => {
        let value = take_hex(&mut chars, 2).ok_or(i)?;
        out.push(char::from_u32(value).ok_or(i)?);
      }
      'u' => {
        let value = take_unicode_escape(&mut chars).ok_or(i)?;
        let c = if (0xd800..0xdc00).contains(&value) {
          // Try to combine with a following low surrogate escape.
          let mut lookahead = chars.clone();
          let low = match (lookahead.next(), lookahead.next()) {
            (Some((_, '\\')), Some((_, 'u'))) => {
              take_unicode_escape(&mut lookahead).filter(|v| (0xdc00..0xe000).contains(v))
            }
            _ => None,
          };
          match low {
            Some(low) => {
              chars = lookahead;
              char::from_u32(0x10000 + ((value - 0xd800) << 10) + (low - 0xdc00))
            }
            None => None,
          }
        } else {
          char::from_u32(value)
        };
        // Lone surrogates cannot be represented in a Rust string.
        out.push(c.unwrap_or(char::REPLACEMENT_CHARACTER));
      }
      e => out.push(e),
    };
  }
  Ok(out)
}

// Strips the delimiters from a raw template part, returning the content's offset within `raw`.
fn template_content(raw: &str, is_end: bool) -> Option<(usize, &str)> {
  let start = if raw.len() > 1 && raw.starts_with('`') {
    1
  } else {
    0
  };
  let end = if is_end {
    raw.strip_suffix('`')?.len()
  } else {
    raw.strip_suffix("${")?.len()
  };
  raw.get(start..end).map(|body| (start, body))
}

impl<'a> Parser<'a> {
  pub fn lit_arr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<LitArrExpr>> {
    self.with_loc(|p| {
      p.require(TT::BracketOpen)?;
      let mut elements = Vec::<LitArrElem>::new();
      loop {
        if p.consume_if(TT::Comma).is_match() {
          elements.push(LitArrElem::Empty);
          continue;
        };
        if p.peek().typ == TT::BracketClose {
          break;
        };
        let rest = p.consume_if(TT::DotDotDot).is_match();
        let value = p.expr(ctx, [TT::Comma, TT::BracketClose])?;
        elements.push(if rest {
          LitArrElem::Rest(value)
        } else {
          LitArrElem::Single(value)
        });
        if p.peek().typ == TT::BracketClose {
          break;
        };
        p.require(TT::Comma)?;
      }
      p.require(TT::BracketClose)?;
      Ok(LitArrExpr { elements })
    })
  }

  pub fn lit_bigint(&mut self) -> SyntaxResult<Node<LitBigIntExpr>> {
    self.with_loc(|p| {
      let value = p.lit_bigint_val()?;
      Ok(LitBigIntExpr { value })
    })
  }

  /// The digits of a BigInt literal, without the trailing `n`.
  pub fn lit_bigint_val(&mut self) -> SyntaxResult<String> {
    let t = self.require(TT::LiteralBigInt)?;
    let raw = self.str(t.loc);
    let digits = raw
      .strip_suffix('n')
      .ok_or_else(|| t.error(SyntaxErrorType::MalformedLiteralBigInt))?;
    Ok(digits.replace('_', ""))
  }

  pub fn lit_bool(&mut self) -> SyntaxResult<Node<LitBoolExpr>> {
    self.with_loc(|p| {
      let t = p.consume();
      let value = match t.typ {
        TT::LiteralTrue => true,
        TT::LiteralFalse => false,
        _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("boolean literal"))),
      };
      Ok(LitBoolExpr { value })
    })
  }

  pub fn lit_null(&mut self) -> SyntaxResult<Node<LitNullExpr>> {
    self.with_loc(|p| {
      p.require(TT::LiteralNull)?;
      Ok(LitNullExpr {})
    })
  }

  pub fn lit_num(&mut self) -> SyntaxResult<Node<LitNumExpr>> {
    self.with_loc(|p| {
      let value = p.lit_num_val()?;
      Ok(LitNumExpr { value })
    })
  }

  pub fn lit_num_val(&mut self) -> SyntaxResult<JsNumber> {
    let t = self.require(TT::LiteralNumber)?;
    JsNumber::from_literal(self.str(t.loc))
      .ok_or_else(|| t.error(SyntaxErrorType::MalformedLiteralNumber))
  }

  pub fn lit_obj(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<LitObjExpr>> {
    self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let mut members = Vec::new();
      while p.peek().typ != TT::BraceClose {
        let member = p.with_loc(|p| {
          if p.consume_if(TT::DotDotDot).is_match() {
            let val = p.expr(ctx, [TT::Comma, TT::BraceClose])?;
            return Ok(ObjMember {
              typ: ObjMemberType::Rest { val },
            });
          };
          let (key, val) = p.class_or_obj_member(ctx, TT::Colon, TT::Comma, &mut super::Asi::no())?;
          let typ = match (key, val) {
            // No value, so it's a shorthand property and must be a valid identifier.
            (ClassOrObjKey::Direct(key), ClassOrObjVal::Prop(None)) => {
              if !super::pat::is_valid_pattern_identifier(key.stx.tt, ctx.rules) {
                return Err(key.error(SyntaxErrorType::ExpectedSyntax("identifier")));
              };
              match p.consume_if(TT::Equals).match_loc() {
                // `{ a = 1 }` is only valid as a pattern; keep it as an assignment so it converts.
                Some(_) => {
                  let default_value = p.expr(ctx, [TT::Comma, TT::BraceClose])?;
                  let id = Node::new(key.loc, IdExpr {
                    name: key.stx.key.clone(),
                  });
                  let assign = Node::new(key.loc + default_value.loc, BinaryExpr {
                    operator: OperatorName::Assignment,
                    left: super::util::lit_to_pat(id.into_wrapped())?.into_stx(),
                    right: default_value,
                  });
                  ObjMemberType::Valued {
                    key: ClassOrObjKey::Direct(key),
                    val: ClassOrObjVal::Prop(Some(assign.into_wrapped())),
                  }
                }
                None => ObjMemberType::Shorthand {
                  id: key.map_stx(|k| IdExpr { name: k.key }),
                },
              }
            }
            (ClassOrObjKey::Computed(key), ClassOrObjVal::Prop(None)) => {
              return Err(key.error(SyntaxErrorType::ExpectedSyntax("object literal value")));
            }
            (key, val) => ObjMemberType::Valued { key, val },
          };
          Ok(ObjMember { typ })
        })?;
        members.push(member);
        if !p.consume_if(TT::Comma).is_match() {
          break;
        };
      }
      p.require(TT::BraceClose)?;
      Ok(LitObjExpr { members })
    })
  }

  pub fn lit_regex(&mut self) -> SyntaxResult<Node<LitRegexExpr>> {
    self.with_loc(|p| {
      let t = p.require_with_mode(TT::LiteralRegex, LexMode::SlashIsRegex)?;
      Ok(LitRegexExpr {
        value: p.string(t.loc),
      })
    })
  }

  pub fn lit_str(&mut self) -> SyntaxResult<Node<LitStrExpr>> {
    self.with_loc(|p| {
      let value = p.lit_str_val()?;
      Ok(LitStrExpr { value })
    })
  }

  /// Parses a literal string and returns its value with escapes decoded.
  /// Does *not* return a node; use `lit_str` for that.
  pub fn lit_str_val(&mut self) -> SyntaxResult<String> {
    let t = self.consume();
    match t.typ {
      TT::LiteralString => {}
      TT::Invalid if self.str(t.loc).starts_with(['"', '\'']) => {
        return Err(t.error(SyntaxErrorType::LineTerminatorInString));
      }
      _ => return Err(t.error(SyntaxErrorType::RequiredTokenNotFound(TT::LiteralString))),
    };
    let body = Loc(t.loc.0 + 1, t.loc.1 - 1);
    decode_literal(self.str(body), false).map_err(|offset| {
      Loc(body.0 + offset, body.0 + offset + 1).error(
        SyntaxErrorType::InvalidCharacterEscape,
        Some(TT::LiteralString),
      )
    })
  }

  pub fn lit_template(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<LitTemplateExpr>> {
    self.with_loc(|p| {
      let parts = p.lit_template_parts(ctx, false)?;
      Ok(LitTemplateExpr { parts })
    })
  }

  fn lit_template_part_string(&mut self, loc: Loc, is_end: bool, tagged: bool) -> SyntaxResult<String> {
    let raw = self.str(loc);
    let (offset, content) =
      template_content(raw, is_end).ok_or_else(|| loc.error(SyntaxErrorType::UnexpectedEnd, None))?;
    match decode_literal(content, true) {
      Ok(s) => Ok(s),
      // Tagged templates may contain invalid escapes; the tag only sees the raw string.
      Err(_) if tagged => Ok(String::new()),
      Err(rel) => {
        let at = loc.0 + offset + rel;
        Err(Loc(at, at + 1).error(SyntaxErrorType::InvalidCharacterEscape, None))
      }
    }
  }

  // NOTE: The next token must definitely be LiteralTemplatePartString{,End}.
  pub fn lit_template_parts(
    &mut self,
    ctx: ParseCtx,
    tagged: bool,
  ) -> SyntaxResult<Vec<LitTemplatePart>> {
    let t = self.consume();
    let mut is_end = match t.typ {
      TT::LiteralTemplatePartString => false,
      TT::LiteralTemplatePartStringEnd => true,
      TT::Invalid => return Err(t.error(SyntaxErrorType::UnexpectedEnd)),
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("template string part"))),
    };
    let mut parts = vec![LitTemplatePart::String(
      self.lit_template_part_string(t.loc, is_end, tagged)?,
    )];
    while !is_end {
      let substitution = self.expr(ctx, [TT::BraceClose])?;
      self.require(TT::BraceClose)?;
      parts.push(LitTemplatePart::Substitution(substitution));
      let string = self.consume_with_mode(LexMode::TemplateStrContinue);
      is_end = match string.typ {
        TT::LiteralTemplatePartString => false,
        TT::LiteralTemplatePartStringEnd => true,
        _ => return Err(string.error(SyntaxErrorType::UnexpectedEnd)),
      };
      parts.push(LitTemplatePart::String(
        self.lit_template_part_string(string.loc, is_end, tagged)?,
      ));
    }
    Ok(parts)
  }
}

#[cfg(test)]
mod tests {
  use super::decode_literal;

  #[test]
  fn decodes_escapes() {
    assert_eq!(decode_literal(r"a\nb\t\x41B\u{43}", false).unwrap(), "a\nb\tABC");
    assert_eq!(decode_literal(r"\101\0", false).unwrap(), "A\0");
    assert_eq!(decode_literal(r"\uD83D\uDE00", false).unwrap(), "\u{1F600}");
    assert_eq!(decode_literal("a\\\nb", false).unwrap(), "ab");
    assert_eq!(decode_literal(r"\q", false).unwrap(), "q");
  }

  #[test]
  fn rejects_malformed_escapes() {
    assert_eq!(decode_literal(r"ab\x4", false), Err(2));
    assert_eq!(decode_literal(r"\u{110000}", false), Err(0));
    assert_eq!(decode_literal("a\nb", false), Err(1));
    assert!(decode_literal("a\nb", true).is_ok());
  }
}
