use crate::loc::Loc;
use crate::token::TT;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use std::error::Error;
use std::fmt::Display;

/// Classification of syntax errors. Each variant has a stable code with the `PS` prefix.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  ExpectedSyntax(&'static str),
  InvalidAssigmentTarget,
  InvalidCharacterEscape,
  LineTerminatorAfterArrowFunctionParameters,
  LineTerminatorAfterThrow,
  LineTerminatorInString,
  MalformedLiteralBigInt,
  MalformedLiteralNumber,
  RequiredTokenNotFound(TT),
  TryStatementHasNoCatchOrFinally,
  UnexpectedEnd,
}

#[derive(Clone)]
pub struct SyntaxError {
  pub typ: SyntaxErrorType,
  pub loc: Loc,
  pub actual_token: Option<TT>,
}

impl SyntaxError {
  pub fn new(typ: SyntaxErrorType, loc: Loc, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError {
      typ,
      loc,
      actual_token,
    }
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self, self.loc.0, self.loc.1)
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} ({})",
      self.typ.message(self.actual_token),
      self.typ.code()
    )
  }
}

impl Error for SyntaxError {}

impl PartialEq for SyntaxError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Eq for SyntaxError {}

pub type SyntaxResult<T> = Result<T, SyntaxError>;

impl SyntaxErrorType {
  pub fn code(&self) -> &'static str {
    match self {
      SyntaxErrorType::ExpectedSyntax(_) => "PS0002",
      SyntaxErrorType::InvalidAssigmentTarget => "PS0003",
      SyntaxErrorType::InvalidCharacterEscape => "PS0004",
      SyntaxErrorType::LineTerminatorAfterArrowFunctionParameters => "PS0006",
      SyntaxErrorType::LineTerminatorAfterThrow => "PS0007",
      SyntaxErrorType::LineTerminatorInString => "PS0010",
      SyntaxErrorType::MalformedLiteralBigInt => "PS0011",
      SyntaxErrorType::MalformedLiteralNumber => "PS0012",
      SyntaxErrorType::RequiredTokenNotFound(_) => "PS0013",
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => "PS0014",
      SyntaxErrorType::UnexpectedEnd => "PS0015",
    }
  }

  pub fn message(&self, actual_token: Option<TT>) -> String {
    match self {
      SyntaxErrorType::ExpectedSyntax(expected) => format!("expected {}", expected),
      SyntaxErrorType::InvalidAssigmentTarget => "invalid assignment target".into(),
      SyntaxErrorType::InvalidCharacterEscape => "invalid character escape".into(),
      SyntaxErrorType::LineTerminatorAfterArrowFunctionParameters => {
        "line terminator not allowed after arrow function parameters".into()
      }
      SyntaxErrorType::LineTerminatorAfterThrow => {
        "line terminator not allowed after `throw`".into()
      }
      SyntaxErrorType::LineTerminatorInString => {
        "line terminator not allowed in string literal".into()
      }
      SyntaxErrorType::MalformedLiteralBigInt => "malformed bigint literal".into(),
      SyntaxErrorType::MalformedLiteralNumber => "malformed number literal".into(),
      SyntaxErrorType::RequiredTokenNotFound(token) => match actual_token {
        Some(actual) => format!("expected token {:?}, found {:?}", token, actual),
        None => format!("expected token {:?}", token),
      },
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => {
        "try statement requires a catch or finally block".into()
      }
      SyntaxErrorType::UnexpectedEnd => "unexpected end of input".into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::SyntaxError;
  use super::SyntaxErrorType;
  use crate::loc::Loc;
  use crate::token::TT;

  #[test]
  fn message_names_the_found_token() {
    let err = SyntaxError::new(
      SyntaxErrorType::RequiredTokenNotFound(TT::BraceClose),
      Loc(4, 5),
      Some(TT::Semicolon),
    );
    assert_eq!(err.to_string(), "expected token BraceClose, found Semicolon (PS0013)");
    let err = SyntaxError::new(SyntaxErrorType::UnexpectedEnd, Loc(9, 9), None);
    assert_eq!(err.to_string(), "unexpected end of input (PS0015)");
  }
}
