use expr::pat::ParsePatternRules;

use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::lex_next;
use crate::lex::Comment;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;

pub mod class_or_object;
pub mod drive;
pub mod expr;
pub mod func;
pub mod import_export;
pub mod operator;
pub mod stmt;
#[cfg(test)]
mod tests;
pub mod toplevel;

// Passed by value to almost every parse method. Treat as immutable and derive altered copies with
// the with_* methods, so nothing needs to be unwound when a call returns.
#[derive(Clone, Copy)]
pub struct ParseCtx {
  pub rules: ParsePatternRules,
}

impl ParseCtx {
  pub fn with_rules(&self, rules: ParsePatternRules) -> ParseCtx {
    ParseCtx { rules, ..*self }
  }
}

#[derive(Debug)]
#[must_use]
pub struct MaybeToken {
  typ: TT,
  loc: Loc,
  matched: bool,
}

impl MaybeToken {
  pub fn is_match(&self) -> bool {
    self.matched
  }

  pub fn match_loc(&self) -> Option<Loc> {
    if self.matched {
      Some(self.loc)
    } else {
      None
    }
  }

  pub fn error(&self, err: SyntaxErrorType) -> SyntaxError {
    debug_assert!(!self.matched);
    self.loc.error(err, Some(self.typ))
  }

  pub fn map<R, F: FnOnce(Self) -> R>(self, f: F) -> Option<R> {
    if self.matched {
      Some(f(self))
    } else {
      None
    }
  }

  pub fn and_then<R, F: FnOnce() -> SyntaxResult<R>>(self, f: F) -> SyntaxResult<Option<R>> {
    Ok(if self.matched { Some(f()?) } else { None })
  }
}

#[derive(Clone, Copy)]
pub struct ParserCheckpoint {
  next_tok_i: usize,
}

struct BufferedToken {
  token: Token,
  lex_mode: LexMode,
}

pub struct Parser<'a> {
  lexer: Lexer<'a>,
  buf: Vec<BufferedToken>,
  next_tok_i: usize,
}

impl<'a> Parser<'a> {
  pub fn new(lexer: Lexer<'a>) -> Parser<'a> {
    Parser {
      lexer,
      buf: Vec::new(),
      next_tok_i: 0,
    }
  }

  pub fn source_range(&self) -> Loc {
    Loc(0, self.lexer.source().len())
  }

  pub fn str(&self, loc: Loc) -> &'a str {
    loc.slice(self.lexer.source())
  }

  pub fn string(&self, loc: Loc) -> String {
    self.str(loc).to_string()
  }

  pub fn take_comments(&mut self) -> Vec<Comment> {
    self.lexer.take_comments()
  }

  pub fn checkpoint(&self) -> ParserCheckpoint {
    ParserCheckpoint {
      next_tok_i: self.next_tok_i,
    }
  }

  /// The range from the first to the last token consumed since the checkpoint. Leading and trailing
  /// whitespace and comments are excluded.
  pub fn since_checkpoint(&self, checkpoint: &ParserCheckpoint) -> Loc {
    if self.next_tok_i <= checkpoint.next_tok_i {
      let at = self
        .buf
        .get(checkpoint.next_tok_i)
        .map(|t| t.token.loc.0)
        .unwrap_or_else(|| self.lexer.next());
      return Loc(at, at);
    };
    Loc(
      self.buf[checkpoint.next_tok_i].token.loc.0,
      self.buf[self.next_tok_i - 1].token.loc.1,
    )
  }

  /// End of the last consumed token.
  pub fn last_end(&self) -> usize {
    match self.next_tok_i {
      0 => 0,
      i => self.buf[i - 1].token.loc.1,
    }
  }

  pub fn restore_checkpoint(&mut self, checkpoint: ParserCheckpoint) {
    self.next_tok_i = checkpoint.next_tok_i;
  }

  fn reset_to(&mut self, n: usize) {
    self.next_tok_i = n;
    self.buf.truncate(n);
    match self.buf.last() {
      Some(t) => self.lexer.set_next(t.token.loc.1),
      None => self.lexer.set_next(0),
    };
  }

  fn forward<K: FnOnce(&Token) -> bool>(&mut self, mode: LexMode, keep: K) -> (bool, Token) {
    // A token buffered under a different mode must be lexed again.
    if self
      .buf
      .get(self.next_tok_i)
      .is_some_and(|t| t.lex_mode != mode)
    {
      self.reset_to(self.next_tok_i);
    }
    debug_assert!(self.buf.len() >= self.next_tok_i);
    if self.buf.len() == self.next_tok_i {
      let token = lex_next(&mut self.lexer, mode);
      self.buf.push(BufferedToken {
        token,
        lex_mode: mode,
      });
    }
    let t = self.buf[self.next_tok_i].token.clone();
    let k = keep(&t);
    if k {
      self.next_tok_i += 1;
    };
    (k, t)
  }

  pub fn consume_with_mode(&mut self, mode: LexMode) -> Token {
    self.forward(mode, |_| true).1
  }

  pub fn consume(&mut self) -> Token {
    self.consume_with_mode(LexMode::Standard)
  }

  /// Consumes the next token regardless of type, and returns its raw source code as a string.
  pub fn consume_as_string(&mut self) -> String {
    let loc = self.consume().loc;
    self.string(loc)
  }

  pub fn peek_with_mode(&mut self, mode: LexMode) -> Token {
    self.forward(mode, |_| false).1
  }

  pub fn peek(&mut self) -> Token {
    self.peek_with_mode(LexMode::Standard)
  }

  pub fn peek_n_with_mode<const N: usize>(&mut self, modes: [LexMode; N]) -> [Token; N] {
    let cp = self.checkpoint();
    let tokens = modes.map(|mode| self.forward(mode, |_| true).1);
    self.restore_checkpoint(cp);
    tokens
  }

  pub fn peek_n<const N: usize>(&mut self) -> [Token; N] {
    self.peek_n_with_mode([LexMode::Standard; N])
  }

  pub fn maybe_consume_with_mode(&mut self, typ: TT, mode: LexMode) -> MaybeToken {
    let (matched, t) = self.forward(mode, |t| t.typ == typ);
    MaybeToken {
      typ,
      matched,
      loc: t.loc,
    }
  }

  pub fn consume_if(&mut self, typ: TT) -> MaybeToken {
    self.maybe_consume_with_mode(typ, LexMode::Standard)
  }

  pub fn consume_if_pred<F: FnOnce(&Token) -> bool>(&mut self, pred: F) -> MaybeToken {
    let (matched, t) = self.forward(LexMode::Standard, pred);
    MaybeToken {
      typ: t.typ,
      matched,
      loc: t.loc,
    }
  }

  pub fn require_with_mode(&mut self, typ: TT, mode: LexMode) -> SyntaxResult<Token> {
    let t = self.consume_with_mode(mode);
    if t.typ != typ {
      Err(t.error(SyntaxErrorType::RequiredTokenNotFound(typ)))
    } else {
      Ok(t)
    }
  }

  pub fn require_predicate<P: FnOnce(TT) -> bool>(
    &mut self,
    pred: P,
    expected: &'static str,
  ) -> SyntaxResult<Token> {
    let t = self.consume_with_mode(LexMode::Standard);
    if !pred(t.typ) {
      Err(t.error(SyntaxErrorType::ExpectedSyntax(expected)))
    } else {
      Ok(t)
    }
  }

  pub fn require(&mut self, typ: TT) -> SyntaxResult<Token> {
    self.require_with_mode(typ, LexMode::Standard)
  }
}
