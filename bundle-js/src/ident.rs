use ahash::HashSet;
use once_cell::sync::Lazy;
use parse_js::char::is_id_continue;
use parse_js::char::is_id_start;

// Words that cannot name a binding in module code, plus globals that must not be shadowed by a
// generated name.
static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  [
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
    // Globals.
    "arguments",
    "eval",
    "Infinity",
    "NaN",
    "undefined",
    "Object",
    "Array",
    "Function",
    "String",
    "Number",
    "Boolean",
    "Symbol",
    "Error",
    "Math",
    "JSON",
    "Promise",
  ]
  .into_iter()
  .collect()
});

pub fn is_reserved(name: &str) -> bool {
  RESERVED.contains(name)
}

/// Whether `name` can be written as a bare identifier, e.g. as a member name after `.`.
pub fn is_identifier_name(name: &str) -> bool {
  let mut chars = name.chars();
  match chars.next() {
    Some(c) if is_id_start(c) => chars.all(is_id_continue),
    _ => false,
  }
}

/// Whether `name` can be used as a binding name.
pub fn is_legal_identifier(name: &str) -> bool {
  is_identifier_name(name) && !is_reserved(name)
}

/// Turns an arbitrary string (a file stem, a package specifier) into a usable binding name.
/// `-x` becomes `X`, any other illegal character becomes `_`, and a leading digit or a reserved
/// word gets a `_` prefix.
pub fn make_legal_identifier(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  let mut upper_next = false;
  for c in raw.chars() {
    if c == '-' {
      upper_next = true;
      continue;
    };
    if upper_next {
      upper_next = false;
      if c.is_ascii_alphanumeric() || c == '_' {
        out.extend(c.to_uppercase());
        continue;
      };
      out.push('_');
    };
    out.push(if is_id_continue(c) { c } else { '_' });
  }
  if upper_next {
    out.push('_');
  };
  if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) || is_reserved(&out) {
    out.insert(0, '_');
  };
  out
}

/// Double-quoted JS string literal for `value`.
pub fn quote_string(value: &str) -> String {
  let mut out = String::with_capacity(value.len() + 2);
  out.push('"');
  for c in value.chars() {
    match c {
      '"' => out.push_str("\\\""),
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\u{2028}' => out.push_str("\\u2028"),
      '\u{2029}' => out.push_str("\\u2029"),
      c => out.push(c),
    };
  }
  out.push('"');
  out
}

/// `object.name` when `name` is an identifier name, otherwise `object["name"]`.
pub fn member_access(object: &str, name: &str) -> String {
  if is_identifier_name(name) {
    format!("{object}.{name}")
  } else {
    format!("{object}[{}]", quote_string(name))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn legalises_file_stems_and_specifiers() {
    assert_eq!(make_legal_identifier("foo"), "foo");
    assert_eq!(make_legal_identifier("lodash-es"), "lodashEs");
    assert_eq!(make_legal_identifier("my.module"), "my_module");
    assert_eq!(make_legal_identifier("@scope/pkg"), "_scope_pkg");
    assert_eq!(make_legal_identifier("2d"), "_2d");
    assert_eq!(make_legal_identifier("default"), "_default");
    assert_eq!(make_legal_identifier("class"), "_class");
    assert_eq!(make_legal_identifier(""), "_");
    assert_eq!(make_legal_identifier("a-"), "a_");
  }

  #[test]
  fn identifier_names() {
    assert!(is_identifier_name("$a_1"));
    assert!(is_identifier_name("default"));
    assert!(!is_legal_identifier("default"));
    assert!(!is_identifier_name("1a"));
    assert!(!is_identifier_name("a b"));
    assert!(!is_identifier_name(""));
  }

  #[test]
  fn member_access_quotes_non_identifiers() {
    assert_eq!(member_access("ext", "map"), "ext.map");
    assert_eq!(member_access("ext", "a-b"), "ext[\"a-b\"]");
    assert_eq!(quote_string("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
  }
}
