use bundle_js::Bundle;
use common::assert_code;
use common::build;
use common::code;
use common::options;
use std::collections::HashSet;

mod common;

fn definers() -> Vec<(&'static str, &'static str)> {
  vec![
    (
      "/main.js",
      "import { getA } from './a';\nimport { getB } from './b';\nimport { getC } from './c';\nconst value = 'main';\nconsole.log(getA(), getB(), getC(), value);",
    ),
    ("/a.js", "export const value = 'a';\nexport function getA() { return value; }"),
    ("/b.js", "export const value = 'b';\nexport function getB() { return value; }"),
    ("/c.js", "export const value = 'c';\nexport function getC() { return value; }"),
  ]
}

#[test]
fn last_definer_keeps_the_name() {
  let out = code(&definers());
  assert_code(
    &out,
    "const _value = 'a';\nfunction getA() { return _value; }\nconst __value = 'b';\nfunction getB() { return __value; }\nconst ___value = 'c';\nfunction getC() { return ___value; }\nconst value = 'main';\nconsole.log(getA(), getB(), getC(), value);\n",
  );
}

#[test]
fn renames_are_distinct_and_stable() {
  let bundle = build(&definers());
  let renamed: Vec<String> = bundle
    .modules()
    .iter()
    .map(|m| m.canonical_name("value"))
    .collect();
  let unique: HashSet<_> = renamed.iter().collect();
  assert_eq!(unique.len(), 4);
  assert_eq!(renamed.iter().filter(|n| *n == "value").count(), 1);
  let again = code(&definers());
  assert_eq!(bundle.generate().unwrap().code, again);
}

#[test]
fn renames_skip_names_already_in_use() {
  let modules = [
    ("/a.js", "export const config = { name: 'a' };"),
    (
      "/main.js",
      "import { config as aConfig } from './a';\nconst config = { name: 'main' };\nconst _config = 'taken';\nconsole.log(aConfig, config, _config);",
    ),
  ];
  let first = code(&modules);
  assert_code(
    &first,
    "const __config = { name: 'a' };\nconst config = { name: 'main' };\nconst _config = 'taken';\nconsole.log(__config, config, _config);\n",
  );
  assert_eq!(code(&modules), first);
}

#[test]
fn globals_are_never_renamed() {
  let out = code(&[
    (
      "/a.js",
      "export const console = { log() {} };\nexport function useIt() { console.log('a'); }",
    ),
    (
      "/main.js",
      "import { useIt } from './a';\nuseIt();\nconsole.log('main');",
    ),
  ]);
  assert_code(
    &out,
    "const _console = { log() {} };\nfunction useIt() { _console.log('a'); }\nuseIt();\nconsole.log('main');\n",
  );
}

#[test]
fn renames_avoid_nested_locals() {
  let out = code(&[
    (
      "/main.js",
      "import { getA } from './a';\nconst value = 'main';\nconsole.log(getA(), value);",
    ),
    (
      "/a.js",
      "export const value = 'a';\nexport function getA() { const _value = 'local'; return value + _value; }",
    ),
  ]);
  assert_code(
    &out,
    "const __value = 'a';\nfunction getA() { const _value = 'local'; return __value + _value; }\nconst value = 'main';\nconsole.log(getA(), value);\n",
  );
}

#[test]
fn shorthand_properties_keep_their_key() {
  let out = code(&[
    ("/a.js", "export const value = 1;"),
    (
      "/main.js",
      "import { value as v } from './a';\nconst value = 2;\nconsole.log({ v, value });",
    ),
  ]);
  assert_code(
    &out,
    "const _value = 1;\nconst value = 2;\nconsole.log({ v: _value, value });\n",
  );
}

#[test]
fn default_exports_take_the_importer_name() {
  let out = code(&[
    ("/main.js", "import add from './add-one';\nconsole.log(add(1));"),
    ("/add-one.js", "export default function (x) { return x + 1; }"),
  ]);
  assert_code(
    &out,
    "var add = function (x) { return x + 1; };\nconsole.log(add(1));\n",
  );
}

#[test]
fn default_exports_fall_back_to_the_file_name() {
  let files = [("/lib/answer-value.js", "export default 6 * 7;")];
  let output = Bundle::build("/lib/answer-value.js", options(&files))
    .unwrap()
    .generate()
    .unwrap();
  assert_code(&output.code, "var answerValue = 6 * 7;\n");
  assert_eq!(output.exports, vec![(
    "default".to_string(),
    "answerValue".to_string()
  )]);
}

#[test]
fn default_names_avoid_module_bindings() {
  let files = [("/util.js", "const util = 1;\nexport default util + 1;")];
  let output = Bundle::build("/util", options(&files))
    .unwrap()
    .generate()
    .unwrap();
  assert_code(&output.code, "const util = 1;\nvar _util = util + 1;\n");
}

#[test]
fn named_default_declarations_lose_the_prefix() {
  let out = code(&[
    ("/main.js", "import Thing from './thing';\nnew Thing();"),
    ("/thing.js", "export default class Widget {}"),
  ]);
  assert_code(&out, "class Widget {}\nnew Widget();\n");
}
