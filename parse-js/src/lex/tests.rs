use super::lex_next;
use super::LexMode;
use super::Lexer;
use crate::loc::Loc;
use crate::token::TT;

fn lex_all(code: &str, mode: LexMode) -> Vec<TT> {
  let mut lexer = Lexer::new(code);
  let mut tokens = Vec::new();
  loop {
    let t = lex_next(&mut lexer, mode);
    if t.typ == TT::EOF {
      break;
    };
    tokens.push(t.typ);
  }
  tokens
}

#[test]
fn keywords_do_not_swallow_identifier_prefixes() {
  assert_eq!(lex_all("in instance inx", LexMode::Standard), vec![
    TT::KeywordIn,
    TT::Identifier,
    TT::Identifier,
  ]);
}

#[test]
fn slash_depends_on_mode() {
  assert_eq!(lex_all("/a/g", LexMode::SlashIsRegex), vec![TT::LiteralRegex]);
  assert_eq!(lex_all("/a/g", LexMode::Standard), vec![
    TT::Slash,
    TT::Identifier,
    TT::Slash,
    TT::Identifier,
  ]);
}

#[test]
fn lexes_number_forms() {
  assert_eq!(
    lex_all("1 1.5 .5 1e3 0x1F 0b10 0o7 10n 1_000", LexMode::Standard),
    vec![TT::LiteralNumber; 7]
      .into_iter()
      .chain([TT::LiteralBigInt, TT::LiteralNumber])
      .collect::<Vec<_>>()
  );
  assert_eq!(lex_all("a?.5:b", LexMode::Standard), vec![
    TT::Identifier,
    TT::Question,
    TT::LiteralNumber,
    TT::Colon,
    TT::Identifier,
  ]);
}

#[test]
fn tracks_line_terminators_and_comments() {
  let code = "a /* x */ b // y\n/** z\n */ c";
  let mut lexer = Lexer::new(code);
  let a = lex_next(&mut lexer, LexMode::Standard);
  let b = lex_next(&mut lexer, LexMode::Standard);
  let c = lex_next(&mut lexer, LexMode::Standard);
  assert!(!a.preceded_by_line_terminator);
  assert!(!b.preceded_by_line_terminator);
  assert!(c.preceded_by_line_terminator);
  let comments = lexer.comments();
  assert_eq!(comments.len(), 3);
  assert_eq!(&code[comments[0].loc.0..comments[0].loc.1], "/* x */");
  assert_eq!(&code[comments[1].loc.0..comments[1].loc.1], "// y");
  assert!(!comments[1].multiline);
  assert_eq!(&code[comments[2].loc.0..comments[2].loc.1], "/** z\n */");
}

#[test]
fn relexing_does_not_duplicate_comments() {
  let mut lexer = Lexer::new("// one\na");
  let cp = lexer.checkpoint();
  lex_next(&mut lexer, LexMode::Standard);
  lexer.apply_checkpoint(cp);
  let tok = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(tok.loc, Loc(7, 8));
  assert_eq!(lexer.comments().len(), 1);
}

#[test]
fn lexes_templates_in_chunks() {
  let code = "`a${b}c`";
  let mut lexer = Lexer::new(code);
  assert_eq!(
    lex_next(&mut lexer, LexMode::Standard).typ,
    TT::LiteralTemplatePartString
  );
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, TT::Identifier);
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, TT::BraceClose);
  let end = lex_next(&mut lexer, LexMode::TemplateStrContinue);
  assert_eq!(end.typ, TT::LiteralTemplatePartStringEnd);
  assert_eq!(end.loc, Loc(6, 8));
}

#[test]
fn unterminated_string_is_invalid() {
  assert_eq!(lex_all("'abc\n'", LexMode::Standard)[0], TT::Invalid);
  assert_eq!(lex_all(r"'a\'b'", LexMode::Standard), vec![TT::LiteralString]);
}
