use crate::char::is_id_continue;
use crate::char::is_id_start;
use crate::char::is_line_terminator;
use crate::char::CharFilter;
use crate::char::DIGIT_BIN;
use crate::char::DIGIT_HEX;
use crate::char::DIGIT_OCT;
use crate::char::ID_CONTINUE_CHARSTR;
use crate::char::ID_START_CHARSTR;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use aho_corasick::AhoCorasick;
use aho_corasick::AhoCorasickBuilder;
use aho_corasick::AhoCorasickKind;
use aho_corasick::Anchored;
use aho_corasick::Input;
use aho_corasick::MatchKind;
use aho_corasick::StartKind;
use core::ops::Index;
use memchr::memchr3;
use once_cell::sync::Lazy;
use serde::Serialize;

#[cfg(test)]
mod tests;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LexMode {
  SlashIsRegex,
  Standard,
  TemplateStrContinue,
}

#[derive(Copy, Clone)]
pub struct LexerCheckpoint {
  next: usize,
}

/// A comment found between tokens. `loc` covers the delimiters.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Comment {
  pub loc: Loc,
  pub multiline: bool,
}

// Contains the match length.
#[derive(Copy, Clone)]
struct Match(usize);

impl Match {
  pub fn len(&self) -> usize {
    self.0
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

struct PatternMatcher {
  patterns: Vec<TT>,
  matcher: AhoCorasick,
  anchored: bool,
}

impl PatternMatcher {
  pub fn new<D: AsRef<[u8]>>(anchored: bool, patterns: Vec<(TT, D)>) -> Self {
    let (tts, syns): (Vec<_>, Vec<_>) = patterns.into_iter().unzip();
    let matcher = AhoCorasickBuilder::new()
      .start_kind(if anchored {
        StartKind::Anchored
      } else {
        StartKind::Unanchored
      })
      .kind(Some(AhoCorasickKind::DFA))
      .match_kind(MatchKind::LeftmostLongest)
      .build(syns)
      .expect("static lexer patterns are valid");
    PatternMatcher {
      patterns: tts,
      matcher,
      anchored,
    }
  }

  pub fn find(&self, lexer: &Lexer) -> LexResult<(TT, Match)> {
    let anchored = if self.anchored {
      Anchored::Yes
    } else {
      Anchored::No
    };
    self
      .matcher
      .find(Input::new(&lexer.source[lexer.next..]).anchored(anchored))
      .map(|m| (self.patterns[m.pattern().as_usize()], Match(m.end())))
      .ok_or(LexNotFound)
  }
}

#[derive(Debug)]
struct LexNotFound;

type LexResult<T> = Result<T, LexNotFound>;

pub struct Lexer<'a> {
  source: &'a str,
  next: usize,
  comments: Vec<Comment>,
}

impl<'a> Lexer<'a> {
  pub fn new(code: &'a str) -> Lexer<'a> {
    Lexer {
      source: code,
      next: 0,
      comments: Vec::new(),
    }
  }

  pub fn source(&self) -> &'a str {
    self.source
  }

  pub fn next(&self) -> usize {
    self.next
  }

  fn end(&self) -> usize {
    self.source.len()
  }

  fn remaining(&self) -> usize {
    self.end() - self.next
  }

  fn eof_range(&self) -> Loc {
    Loc(self.end(), self.end())
  }

  fn at_end(&self) -> bool {
    self.next >= self.end()
  }

  fn peek(&self, n: usize) -> LexResult<char> {
    self.peek_or_eof(n).ok_or(LexNotFound)
  }

  fn peek_or_eof(&self, n: usize) -> Option<char> {
    self.source[self.next..].chars().nth(n)
  }

  /// Prefer checkpoints. The parser uses this to resume lexing after a buffered token.
  pub fn set_next(&mut self, next: usize) {
    self.next = next;
  }

  pub fn checkpoint(&self) -> LexerCheckpoint {
    LexerCheckpoint { next: self.next }
  }

  pub fn since_checkpoint(&self, checkpoint: LexerCheckpoint) -> Loc {
    Loc(checkpoint.next, self.next)
  }

  pub fn apply_checkpoint(&mut self, checkpoint: LexerCheckpoint) {
    self.next = checkpoint.next;
  }

  /// Comments seen so far, in source order.
  pub fn comments(&self) -> &[Comment] {
    &self.comments
  }

  pub fn take_comments(&mut self) -> Vec<Comment> {
    std::mem::take(&mut self.comments)
  }

  // The parser rewinds and re-lexes, so the same comment can be seen more than once.
  fn record_comment(&mut self, comment: Comment) {
    if self
      .comments
      .last()
      .map_or(true, |last| last.loc.0 < comment.loc.0)
    {
      self.comments.push(comment);
    };
  }

  fn n(&self, n: usize) -> LexResult<Match> {
    if self.next + n > self.end() {
      return Err(LexNotFound);
    };
    Ok(Match(n))
  }

  fn if_char(&self, c: char) -> Match {
    match self.peek_or_eof(0) {
      Some(first) if first == c => Match(c.len_utf8()),
      _ => Match(0),
    }
  }

  fn while_not_3_chars(&self, a: char, b: char, c: char) -> Match {
    debug_assert!(a.is_ascii() && b.is_ascii() && c.is_ascii());
    Match(
      memchr3(a as u8, b as u8, c as u8, self.source[self.next..].as_bytes())
        .unwrap_or(self.remaining()),
    )
  }

  fn while_pred(&self, pred: impl Fn(char) -> bool) -> Match {
    let mut len = 0;
    for ch in self.source[self.next..].chars() {
      if !pred(ch) {
        break;
      };
      len += ch.len_utf8();
    }
    Match(len)
  }

  fn while_chars(&self, chars: &CharFilter) -> Match {
    self.while_pred(|c| chars.has(c))
  }

  fn consume(&mut self, m: Match) -> Match {
    self.next += m.len();
    m
  }

  fn consume_next(&mut self) -> LexResult<char> {
    let c = self.peek(0)?;
    self.next += c.len_utf8();
    Ok(c)
  }

  fn skip_expect(&mut self, n: usize) {
    debug_assert!(self.next + n <= self.end());
    self.next += n;
  }

  fn drive_fallible(
    &mut self,
    preceded_by_line_terminator: bool,
    f: impl FnOnce(&mut Self) -> LexResult<TT>,
  ) -> Token {
    let cp = self.checkpoint();
    let typ = f(self).unwrap_or(TT::Invalid);
    Token {
      loc: self.since_checkpoint(cp),
      typ,
      preceded_by_line_terminator,
    }
  }
}

impl<'a> Index<Loc> for Lexer<'a> {
  type Output = str;

  fn index(&self, index: Loc) -> &Self::Output {
    &self.source[index.0..index.1]
  }
}

#[rustfmt::skip]
pub static OPERATORS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::Ampersand, "&");
  map.insert(TT::AmpersandAmpersand, "&&");
  map.insert(TT::AmpersandAmpersandEquals, "&&=");
  map.insert(TT::AmpersandEquals, "&=");
  map.insert(TT::Asterisk, "*");
  map.insert(TT::AsteriskAsterisk, "**");
  map.insert(TT::AsteriskAsteriskEquals, "**=");
  map.insert(TT::AsteriskEquals, "*=");
  map.insert(TT::Bar, "|");
  map.insert(TT::BarBar, "||");
  map.insert(TT::BarBarEquals, "||=");
  map.insert(TT::BarEquals, "|=");
  map.insert(TT::BraceClose, "}");
  map.insert(TT::BraceOpen, "{");
  map.insert(TT::BracketClose, "]");
  map.insert(TT::BracketOpen, "[");
  map.insert(TT::Caret, "^");
  map.insert(TT::CaretEquals, "^=");
  map.insert(TT::ChevronLeft, "<");
  map.insert(TT::ChevronLeftChevronLeft, "<<");
  map.insert(TT::ChevronLeftChevronLeftEquals, "<<=");
  map.insert(TT::ChevronLeftEquals, "<=");
  map.insert(TT::ChevronRight, ">");
  map.insert(TT::ChevronRightChevronRight, ">>");
  map.insert(TT::ChevronRightChevronRightChevronRight, ">>>");
  map.insert(TT::ChevronRightChevronRightChevronRightEquals, ">>>=");
  map.insert(TT::ChevronRightChevronRightEquals, ">>=");
  map.insert(TT::ChevronRightEquals, ">=");
  map.insert(TT::Colon, ":");
  map.insert(TT::Comma, ",");
  map.insert(TT::Dot, ".");
  map.insert(TT::DotDotDot, "...");
  map.insert(TT::Equals, "=");
  map.insert(TT::EqualsChevronRight, "=>");
  map.insert(TT::EqualsEquals, "==");
  map.insert(TT::EqualsEqualsEquals, "===");
  map.insert(TT::Exclamation, "!");
  map.insert(TT::ExclamationEquals, "!=");
  map.insert(TT::ExclamationEqualsEquals, "!==");
  map.insert(TT::Hyphen, "-");
  map.insert(TT::HyphenEquals, "-=");
  map.insert(TT::HyphenHyphen, "--");
  map.insert(TT::ParenthesisClose, ")");
  map.insert(TT::ParenthesisOpen, "(");
  map.insert(TT::Percent, "%");
  map.insert(TT::PercentEquals, "%=");
  map.insert(TT::Plus, "+");
  map.insert(TT::PlusEquals, "+=");
  map.insert(TT::PlusPlus, "++");
  map.insert(TT::PrivateMember, "#");
  map.insert(TT::Question, "?");
  map.insert(TT::QuestionDot, "?.");
  map.insert(TT::QuestionDotBracketOpen, "?.[");
  map.insert(TT::QuestionDotParenthesisOpen, "?.(");
  map.insert(TT::QuestionQuestion, "??");
  map.insert(TT::QuestionQuestionEquals, "??=");
  map.insert(TT::Semicolon, ";");
  map.insert(TT::Slash, "/");
  map.insert(TT::SlashEquals, "/=");
  map.insert(TT::Tilde, "~");
  map
});

pub static KEYWORDS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::KeywordAs, "as");
  map.insert(TT::KeywordAsync, "async");
  map.insert(TT::KeywordAwait, "await");
  map.insert(TT::KeywordBreak, "break");
  map.insert(TT::KeywordCase, "case");
  map.insert(TT::KeywordCatch, "catch");
  map.insert(TT::KeywordClass, "class");
  map.insert(TT::KeywordConst, "const");
  map.insert(TT::KeywordContinue, "continue");
  map.insert(TT::KeywordDebugger, "debugger");
  map.insert(TT::KeywordDefault, "default");
  map.insert(TT::KeywordDelete, "delete");
  map.insert(TT::KeywordDo, "do");
  map.insert(TT::KeywordElse, "else");
  map.insert(TT::KeywordExport, "export");
  map.insert(TT::KeywordExtends, "extends");
  map.insert(TT::KeywordFinally, "finally");
  map.insert(TT::KeywordFor, "for");
  map.insert(TT::KeywordFrom, "from");
  map.insert(TT::KeywordFunction, "function");
  map.insert(TT::KeywordGet, "get");
  map.insert(TT::KeywordIf, "if");
  map.insert(TT::KeywordImport, "import");
  map.insert(TT::KeywordIn, "in");
  map.insert(TT::KeywordInstanceof, "instanceof");
  map.insert(TT::KeywordLet, "let");
  map.insert(TT::KeywordNew, "new");
  map.insert(TT::KeywordOf, "of");
  map.insert(TT::KeywordReturn, "return");
  map.insert(TT::KeywordSet, "set");
  map.insert(TT::KeywordStatic, "static");
  map.insert(TT::KeywordSuper, "super");
  map.insert(TT::KeywordSwitch, "switch");
  map.insert(TT::KeywordThis, "this");
  map.insert(TT::KeywordThrow, "throw");
  map.insert(TT::KeywordTry, "try");
  map.insert(TT::KeywordTypeof, "typeof");
  map.insert(TT::KeywordVar, "var");
  map.insert(TT::KeywordVoid, "void");
  map.insert(TT::KeywordWhile, "while");
  map.insert(TT::KeywordWith, "with");
  map.insert(TT::KeywordYield, "yield");
  map.insert(TT::LiteralFalse, "false");
  map.insert(TT::LiteralNull, "null");
  map.insert(TT::LiteralTrue, "true");
  map
});

pub static KEYWORD_STRS: Lazy<HashSet<&'static str>> =
  Lazy::new(|| KEYWORDS_MAPPING.values().copied().collect());

#[rustfmt::skip]
static SIG: Lazy<PatternMatcher> = Lazy::new(|| {
  let mut patterns: Vec<(TT, String)> = Vec::new();
  for (&k, &v) in OPERATORS_MAPPING.iter() {
    patterns.push((k, v.into()));
  }
  for (&k, &v) in KEYWORDS_MAPPING.iter() {
    patterns.push((k, v.into()));
    // A longer identifier that merely starts with a keyword must not lex as the keyword.
    for c in ID_CONTINUE_CHARSTR.chars() {
      let mut v = v.to_string();
      v.push(c);
      if !KEYWORD_STRS.contains(v.as_str()) {
        patterns.push((TT::Identifier, v));
      }
    }
  }
  for c in ID_START_CHARSTR.chars() {
    patterns.push((TT::Identifier, c.to_string()));
  }
  patterns.push((TT::Identifier, "\\".into()));
  for c in '0'..='9' {
    patterns.push((TT::LiteralNumber, c.to_string()));
    // `.5` is a number, not a member access.
    patterns.push((TT::LiteralNumber, format!(".{}", c)));
    // `a?.5:b` is a conditional, not optional chaining.
    patterns.push((TT::Question, format!("?.{}", c)));
  }
  patterns.push((TT::LiteralNumberBin, "0b".into()));
  patterns.push((TT::LiteralNumberBin, "0B".into()));
  patterns.push((TT::LiteralNumberHex, "0x".into()));
  patterns.push((TT::LiteralNumberHex, "0X".into()));
  patterns.push((TT::LiteralNumberOct, "0o".into()));
  patterns.push((TT::LiteralNumberOct, "0O".into()));
  patterns.push((TT::LiteralString, "\"".into()));
  patterns.push((TT::LiteralString, "'".into()));
  patterns.push((TT::LiteralTemplatePartString, "`".into()));

  PatternMatcher::new(true, patterns)
});

static ML_COMMENT: Lazy<PatternMatcher> = Lazy::new(|| {
  PatternMatcher::new::<&str>(false, vec![
    (TT::CommentMultilineEnd, "*/"),
    (TT::LineTerminator, "\r"),
    (TT::LineTerminator, "\n"),
    (TT::LineTerminator, "\u{2028}"),
    (TT::LineTerminator, "\u{2029}"),
  ])
});

static INSIG: Lazy<PatternMatcher> = Lazy::new(|| {
  let mut patterns = vec![
    (TT::LineTerminator, "\r".to_string()),
    (TT::LineTerminator, "\n".to_string()),
    (TT::LineTerminator, "\u{2028}".to_string()),
    (TT::LineTerminator, "\u{2029}".to_string()),
    (TT::CommentMultiline, "/*".to_string()),
    (TT::CommentSingle, "//".to_string()),
  ];
  for c in crate::char::ECMASCRIPT_WHITESPACE {
    patterns.push((TT::Whitespace, c.to_string()));
  }
  PatternMatcher::new(true, patterns)
});

/// Returns whether the comment includes a line terminator.
fn lex_multiline_comment(lexer: &mut Lexer<'_>) -> bool {
  let start = lexer.next();
  // Consume `/*`.
  lexer.skip_expect(2);
  let mut contains_newline = false;
  loop {
    // An unterminated comment runs to the end of the source.
    let (tt, mat) = ML_COMMENT
      .find(lexer)
      .unwrap_or((TT::EOF, Match(lexer.remaining())));
    lexer.consume(mat);
    match tt {
      TT::LineTerminator => contains_newline = true,
      _ => break,
    };
  }
  lexer.record_comment(Comment {
    loc: Loc(start, lexer.next()),
    multiline: true,
  });
  contains_newline
}

fn lex_single_comment(lexer: &mut Lexer<'_>) {
  let start = lexer.next();
  lexer.skip_expect(2);
  // The terminating line terminator is not part of the comment.
  lexer.consume(lexer.while_pred(|c| !is_line_terminator(c)));
  lexer.record_comment(Comment {
    loc: Loc(start, lexer.next()),
    multiline: false,
  });
}

fn lex_unicode_escape(lexer: &mut Lexer<'_>) -> LexResult<()> {
  // Consume `\`.
  lexer.skip_expect(1);
  if lexer.consume_next()? != 'u' {
    return Err(LexNotFound);
  };
  if lexer.peek_or_eof(0) == Some('{') {
    lexer.skip_expect(1);
    if lexer.consume(lexer.while_chars(&DIGIT_HEX)).is_empty() {
      return Err(LexNotFound);
    };
    if lexer.consume_next()? != '}' {
      return Err(LexNotFound);
    };
  } else {
    for _ in 0..4 {
      if !DIGIT_HEX.has(lexer.consume_next()?) {
        return Err(LexNotFound);
      };
    }
  };
  Ok(())
}

fn lex_identifier(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  let starter = lexer.peek(0)?;
  if starter == '\\' {
    lex_unicode_escape(lexer)?;
  } else if is_id_start(starter) {
    lexer.skip_expect(starter.len_utf8());
  } else {
    return Err(LexNotFound);
  };
  loop {
    lexer.consume(lexer.while_pred(is_id_continue));
    if lexer.peek_or_eof(0) != Some('\\') {
      break;
    };
    lex_unicode_escape(lexer)?;
  }
  Ok(TT::Identifier)
}

fn is_digit_or_separator(c: char) -> bool {
  c.is_ascii_digit() || c == '_'
}

fn lex_bigint_or_number(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  let start = lexer.next();
  lexer.consume(lexer.while_pred(is_digit_or_separator));
  if !lexer.consume(lexer.if_char('n')).is_empty() {
    return Ok(TT::LiteralBigInt);
  };
  let integer = &lexer[Loc(start, lexer.next())];
  let legacy_octal = integer.len() > 1 && integer.starts_with('0');
  if !legacy_octal && !lexer.consume(lexer.if_char('.')).is_empty() {
    lexer.consume(lexer.while_pred(is_digit_or_separator));
  };
  if matches!(lexer.peek_or_eof(0), Some('e' | 'E')) {
    lexer.skip_expect(1);
    if matches!(lexer.peek(0)?, '+' | '-') {
      lexer.skip_expect(1);
    };
    if lexer.consume(lexer.while_pred(is_digit_or_separator)).is_empty() {
      return Err(LexNotFound);
    };
  };
  // A number cannot be immediately followed by an identifier (e.g. `3in`).
  if lexer.peek_or_eof(0).is_some_and(is_id_start) {
    return Err(LexNotFound);
  };
  Ok(TT::LiteralNumber)
}

fn lex_radix_bigint_or_number(lexer: &mut Lexer<'_>, digits: &CharFilter) -> LexResult<TT> {
  // Consume the `0x`-style prefix.
  lexer.skip_expect(2);
  if lexer
    .consume(lexer.while_pred(|c| c == '_' || digits.has(c)))
    .is_empty()
  {
    return Err(LexNotFound);
  };
  if !lexer.consume(lexer.if_char('n')).is_empty() {
    return Ok(TT::LiteralBigInt);
  };
  Ok(TT::LiteralNumber)
}

fn lex_private_member(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  // Include the `#` in the token.
  lexer.skip_expect(1);
  lex_identifier(lexer)?;
  Ok(TT::PrivateMember)
}

fn lex_regex(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  // Consume slash.
  lexer.consume(lexer.n(1)?);
  let mut in_charset = false;
  loop {
    match lexer.consume_next()? {
      '\\' => {
        let escaped = lexer.peek(0)?;
        if is_line_terminator(escaped) {
          return Ok(TT::Invalid);
        };
        lexer.skip_expect(escaped.len_utf8());
      }
      '/' if !in_charset => break,
      '[' => in_charset = true,
      ']' if in_charset => in_charset = false,
      c if is_line_terminator(c) => return Ok(TT::Invalid),
      _ => {}
    };
  }
  // Flags.
  lexer.consume(lexer.while_pred(is_id_continue));
  Ok(TT::LiteralRegex)
}

fn lex_string(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  let quote = lexer.consume_next()?;
  loop {
    lexer.consume(lexer.while_not_3_chars('\\', '\n', quote));
    match lexer.consume_next()? {
      '\\' => {
        // Also covers line continuations; `\r\n` leaves the `\n` for the next iteration's check.
        let escaped = lexer.consume_next()?;
        if escaped == '\r' {
          lexer.consume(lexer.if_char('\n'));
        };
      }
      '\n' => return Ok(TT::Invalid),
      _ => break,
    };
  }
  Ok(TT::LiteralString)
}

/// Lexes a template chunk up to and including `${` or the closing backtick.
fn lex_template_string_continue(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  loop {
    lexer.consume(lexer.while_not_3_chars('\\', '`', '$'));
    match lexer.consume_next()? {
      '\\' => {
        lexer.consume_next()?;
      }
      '`' => return Ok(TT::LiteralTemplatePartStringEnd),
      _ => {
        if !lexer.consume(lexer.if_char('{')).is_empty() {
          return Ok(TT::LiteralTemplatePartString);
        };
      }
    };
  }
}

fn lex_template(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  // Consume backtick.
  lexer.skip_expect(1);
  lex_template_string_continue(lexer)
}

/// Skips insignificant text, then lexes one token. Comments are recorded on the lexer.
pub fn lex_next(lexer: &mut Lexer<'_>, mode: LexMode) -> Token {
  if mode == LexMode::TemplateStrContinue {
    return lexer.drive_fallible(false, lex_template_string_continue);
  };

  let mut preceded_by_line_terminator = false;
  while let Ok((tt, mat)) = INSIG.find(lexer) {
    match tt {
      TT::LineTerminator => {
        lexer.consume(mat);
        preceded_by_line_terminator = true;
      }
      TT::Whitespace => {
        lexer.consume(mat);
      }
      TT::CommentMultiline => {
        preceded_by_line_terminator |= lex_multiline_comment(lexer);
      }
      _ => lex_single_comment(lexer),
    };
  }

  // EOF gets its own token type rather than the Invalid that drive_fallible would produce.
  if lexer.at_end() {
    return Token {
      loc: lexer.eof_range(),
      typ: TT::EOF,
      preceded_by_line_terminator,
    };
  };

  lexer.drive_fallible(preceded_by_line_terminator, |lexer| {
    if lexer.peek(0)?.is_ascii() {
      let (tt, mat) = SIG.find(lexer)?;
      match tt {
        TT::Identifier => lex_identifier(lexer),
        TT::LiteralNumber => lex_bigint_or_number(lexer),
        TT::LiteralNumberBin => lex_radix_bigint_or_number(lexer, &DIGIT_BIN),
        TT::LiteralNumberHex => lex_radix_bigint_or_number(lexer, &DIGIT_HEX),
        TT::LiteralNumberOct => lex_radix_bigint_or_number(lexer, &DIGIT_OCT),
        TT::LiteralString => lex_string(lexer),
        TT::LiteralTemplatePartString => lex_template(lexer),
        TT::PrivateMember => lex_private_member(lexer),
        TT::Slash | TT::SlashEquals if mode == LexMode::SlashIsRegex => lex_regex(lexer),
        // `?.5` only ever matches `?`.
        TT::Question => {
          lexer.skip_expect(1);
          Ok(TT::Question)
        }
        typ => {
          lexer.consume(mat);
          Ok(typ)
        }
      }
    } else {
      lex_identifier(lexer)
    }
  })
}
