use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::token::TT;
use serde::Serialize;
use std::cmp::max;
use std::cmp::min;
use std::ops::Add;
use std::ops::AddAssign;

/// A half-open range of UTF-8 byte offsets into the source text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn error(self, typ: SyntaxErrorType, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError::new(typ, self, actual_token)
  }

  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1.saturating_sub(self.0)
  }

  pub fn contains(&self, other: Loc) -> bool {
    self.0 <= other.0 && other.1 <= self.1
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  pub fn add_option(self, rhs: Option<Loc>) -> Loc {
    let mut new = self;
    if let Some(rhs) = rhs {
      new.extend(rhs);
    };
    new
  }

  /// The source text covered by this range.
  pub fn slice<'a>(&self, source: &'a str) -> &'a str {
    &source[self.0..self.1]
  }
}

impl Add for Loc {
  type Output = Loc;

  fn add(self, rhs: Self) -> Self::Output {
    let mut new = self;
    new.extend(rhs);
    new
  }
}

impl AddAssign for Loc {
  fn add_assign(&mut self, rhs: Self) {
    self.extend(rhs);
  }
}

/// A 1-based line and column, with the column counted in characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct Location {
  pub line: usize,
  pub column: usize,
}

impl Location {
  pub fn from_offset(source: &str, offset: usize) -> Location {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
      offset -= 1;
    }
    let before = &source[..offset];
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    Location {
      line: before.matches('\n').count() + 1,
      column: before[line_start..].chars().count() + 1,
    }
  }
}

impl std::fmt::Display for Location {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}", self.line, self.column)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extends_to_cover_both_ranges() {
    let mut loc = Loc(4, 10);
    loc.extend(Loc(1, 6));
    assert_eq!(loc, Loc(1, 10));
    assert_eq!(Loc(3, 5) + Loc(8, 9), Loc(3, 9));
    assert_eq!(Loc(3, 5).add_option(None), Loc(3, 5));
  }

  #[test]
  fn contains_nested_ranges_only() {
    assert!(Loc(0, 10).contains(Loc(2, 10)));
    assert!(!Loc(0, 10).contains(Loc(2, 11)));
  }

  #[test]
  fn location_is_one_based() {
    let src = "let a;\nlet bé = 1;\n";
    assert_eq!(Location::from_offset(src, 0), Location { line: 1, column: 1 });
    assert_eq!(Location::from_offset(src, 7), Location { line: 2, column: 1 });
    // `=` follows a two-byte character.
    let eq = src.find('=').unwrap();
    assert_eq!(Location::from_offset(src, eq), Location { line: 2, column: 8 });
    assert_eq!(Location::from_offset(src, 1000).line, 3);
  }
}
