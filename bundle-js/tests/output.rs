use bundle_js::Bundle;
use common::assert_code;
use common::code;
use common::options;

mod common;

const COMMENTED: &str = "// header\nconst a = 1;\n\n/* doc */\nfunction f() {\n  return a; // inner\n}\n\n\nf(); // call\n";

#[test]
fn single_module_round_trips() {
  let source = "const a = 1;\nlet b = a + 1;\nfunction f(x) {\n  return x * b;\n}\nclass C {\n  m() { return f(a); }\n}\nconsole.log(new C().m());\n";
  assert_code(&code(&[("/main.js", source)]), source);
}

#[test]
fn comments_and_margins_round_trip() {
  let files = [("/main.js", COMMENTED)];
  let output = Bundle::build("/main.js", options(&files).with_margins(true))
    .unwrap()
    .generate()
    .unwrap();
  assert_code(&output.code, COMMENTED);
}

#[test]
fn margins_are_off_by_default() {
  assert_code(
    &code(&[("/main.js", COMMENTED)]),
    "// header\nconst a = 1;\n/* doc */\nfunction f() {\n  return a; // inner\n}\nf(); // call\n",
  );
}

#[test]
fn comments_can_be_dropped() {
  let files = [("/main.js", COMMENTED)];
  let output = Bundle::build("/main.js", options(&files).with_comments(false))
    .unwrap()
    .generate()
    .unwrap();
  assert_code(
    &output.code,
    "const a = 1;\nfunction f() {\n  return a; // inner\n}\nf();\n",
  );
}

#[test]
fn margins_only_apply_within_a_module() {
  let files = [
    ("/main.js", "import { a } from './a';\n\n\nconsole.log(a);"),
    ("/a.js", "export const a = 1;\n\n\nexport const b = 2;"),
  ];
  let output = Bundle::build("/main.js", options(&files).with_margins(true))
    .unwrap()
    .generate()
    .unwrap();
  assert_code(&output.code, "const a = 1;\nconsole.log(a);\n");
}

#[test]
fn empty_bundles_are_empty() {
  assert_eq!(code(&[("/main.js", "function unused() {}")]), "");
}
