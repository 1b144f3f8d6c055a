use core::hash::Hash;
use core::hash::Hasher;
use serde::Serialize;
use serde::Serializer;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

/// A JS number value that can be compared, ordered and hashed. All NaNs are equal to each other.
#[derive(Copy, Clone, Debug)]
pub struct JsNumber(pub f64);

impl JsNumber {
  /// Evaluates the source text of a numeric literal. Returns None for malformed input.
  pub fn from_literal(raw: &str) -> Option<JsNumber> {
    let raw = raw.replace('_', "");
    let radix = match raw.get(..2) {
      Some("0x" | "0X") => Some(16),
      Some("0b" | "0B") => Some(2),
      Some("0o" | "0O") => Some(8),
      _ => None,
    };
    if let Some(radix) = radix {
      return parse_radix(&raw[2..], radix);
    };
    // Legacy octal such as `0755`; anything containing 8 or 9 is decimal.
    if raw.len() > 1
      && raw.starts_with('0')
      && raw.bytes().all(|b| b.is_ascii_digit())
      && !raw.bytes().any(|b| b == b'8' || b == b'9')
    {
      return parse_radix(&raw[1..], 8);
    };
    raw.parse::<f64>().ok().map(JsNumber)
  }
}

fn parse_radix(digits: &str, radix: u32) -> Option<JsNumber> {
  if digits.is_empty() {
    return None;
  };
  let mut value = 0f64;
  for c in digits.chars() {
    value = value * radix as f64 + c.to_digit(radix)? as f64;
  }
  Some(JsNumber(value))
}

impl Display for JsNumber {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl PartialEq for JsNumber {
  fn eq(&self, other: &Self) -> bool {
    if self.0.is_nan() {
      return other.0.is_nan();
    };
    self.0.eq(&other.0)
  }
}

impl Eq for JsNumber {}

impl Ord for JsNumber {
  fn cmp(&self, other: &Self) -> Ordering {
    self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
  }
}

impl PartialOrd for JsNumber {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Hash for JsNumber {
  fn hash<H: Hasher>(&self, state: &mut H) {
    // 0.0 and -0.0 are equal so must hash the same.
    if self.0 == 0.0 {
      0u64.hash(state);
    } else if !self.0.is_nan() {
      self.0.to_bits().hash(state);
    };
  }
}

impl Serialize for JsNumber {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::JsNumber;

  #[test]
  fn evaluates_literal_forms() {
    assert_eq!(JsNumber::from_literal("42"), Some(JsNumber(42.0)));
    assert_eq!(JsNumber::from_literal("1_000"), Some(JsNumber(1000.0)));
    assert_eq!(JsNumber::from_literal("0x1F"), Some(JsNumber(31.0)));
    assert_eq!(JsNumber::from_literal("0b101"), Some(JsNumber(5.0)));
    assert_eq!(JsNumber::from_literal("0o17"), Some(JsNumber(15.0)));
    assert_eq!(JsNumber::from_literal("017"), Some(JsNumber(15.0)));
    assert_eq!(JsNumber::from_literal("019"), Some(JsNumber(19.0)));
    assert_eq!(JsNumber::from_literal(".5e1"), Some(JsNumber(5.0)));
    assert_eq!(JsNumber::from_literal("0x"), None);
  }
}
