#![allow(dead_code)]

use bundle_js::Bundle;
use bundle_js::BundleOptions;
use bundle_js::MemoryFiles;
use similar::ChangeTag;
use similar::TextDiff;

pub fn files(modules: &[(&str, &str)]) -> MemoryFiles {
  let mut files = MemoryFiles::new();
  for (path, source) in modules {
    files.insert(path, *source);
  }
  files
}

pub fn options(modules: &[(&str, &str)]) -> BundleOptions {
  BundleOptions::new().with_files(files(modules))
}

pub fn build(modules: &[(&str, &str)]) -> Bundle {
  Bundle::build("/main.js", options(modules)).unwrap()
}

pub fn code(modules: &[(&str, &str)]) -> String {
  build(modules).generate().unwrap().code
}

pub fn assert_code(actual: &str, expected: &str) {
  if actual == expected {
    return;
  };
  let mut msg = String::from("generated code differs:\n");
  let diff = TextDiff::from_lines(expected, actual);
  for change in diff.iter_all_changes() {
    let sign = match change.tag() {
      ChangeTag::Delete => "-",
      ChangeTag::Insert => "+",
      ChangeTag::Equal => " ",
    };
    msg.push_str(sign);
    msg.push_str(&change.to_string_lossy());
    if change.missing_newline() {
      msg.push('\n');
    };
  }
  panic!("{}", msg);
}
