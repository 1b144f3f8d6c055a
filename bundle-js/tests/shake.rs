use bundle_js::Bundle;
use bundle_js::BundleError;
use common::assert_code;
use common::build;
use common::code;
use common::options;

mod common;

#[test]
fn unused_exports_are_dropped() {
  let out = code(&[
    (
      "/main.js",
      "import { add } from './math';\nconsole.log(add(1, 2));\n",
    ),
    (
      "/math.js",
      "export function add(a, b) {\n  return a + b;\n}\n\nexport function sub(a, b) {\n  return a - b;\n}\n",
    ),
  ]);
  assert_code(
    &out,
    "function add(a, b) {\n  return a + b;\n}\nconsole.log(add(1, 2));\n",
  );
  assert!(!out.contains("sub"));
}

#[test]
fn dependencies_come_before_consumers() {
  let bundle = build(&[
    (
      "/main.js",
      "import { b } from './b';\nimport { a } from './a';\nexport const c = a + b;",
    ),
    ("/b.js", "import { a } from './a';\nexport const b = a * 2;"),
    ("/a.js", "export const a = 1;"),
  ]);
  let order: Vec<_> = bundle
    .modules()
    .iter()
    .map(|m| m.path.to_string_lossy().into_owned())
    .collect();
  assert_eq!(order, vec!["/a.js", "/b.js", "/main.js"]);
  let output = bundle.generate().unwrap();
  assert_code(
    &output.code,
    "const a = 1;\nconst b = a * 2;\nconst c = a + b;\n",
  );
  assert_eq!(output.exports, vec![("c".to_string(), "c".to_string())]);
}

#[test]
fn statements_keep_source_order() {
  let source = "const x = 1;\nconsole.log(y);\nconst y = 2;\nconsole.log(x);";
  let bundle = build(&[("/main.js", source)]);
  let ids: Vec<_> = bundle.statements().iter().map(|(_, id)| *id).collect();
  assert_eq!(ids, vec![0, 1, 2, 3]);
  assert_code(&bundle.generate().unwrap().code, &format!("{source}\n"));
}

#[test]
fn bare_imports_keep_their_side_effects() {
  let out = code(&[
    (
      "/main.js",
      "import './polyfill';\nconst unused = 1;\nfunction helper() {}\nconsole.log('hi');",
    ),
    (
      "/polyfill.js",
      "window.ready = true;\nfunction unusedPolyfillHelper() {}\n",
    ),
  ]);
  assert_code(&out, "window.ready = true;\nconsole.log('hi');\n");
}

#[test]
fn requested_exports_narrow_the_output() {
  let files = [(
    "/main.js",
    "export const a = 1;\nexport const b = 2;\nexport function c() { return a; }",
  )];
  let bundle = Bundle::build("/main.js", options(&files).with_exports(["c"])).unwrap();
  let output = bundle.generate().unwrap();
  assert_code(&output.code, "const a = 1;\nfunction c() { return a; }\n");
  assert_eq!(output.exports, vec![("c".to_string(), "c".to_string())]);
}

#[test]
fn missing_export_through_reexport_chain() {
  let files = [
    ("/main.js", "import { nope } from './mid';\nconsole.log(nope);"),
    ("/mid.js", "export { nope } from './leaf';"),
    ("/leaf.js", "export const yes = 1;"),
  ];
  match Bundle::build("/main.js", options(&files)) {
    Err(BundleError::MissingExport {
      path,
      importer,
      name,
    }) => {
      assert_eq!(path.to_string_lossy(), "/leaf.js");
      assert_eq!(importer.to_string_lossy(), "/mid.js");
      assert_eq!(name, "nope");
    }
    Err(err) => panic!("unexpected error {err}"),
    Ok(_) => panic!("expected a missing export"),
  }
}

#[test]
fn star_exports_resolve_in_order() {
  let out = code(&[
    ("/main.js", "import { x } from './all';\nconsole.log(x);"),
    ("/all.js", "export * from './x';\nexport * from './y';"),
    ("/x.js", "export const x = 'x';"),
    ("/y.js", "export const x = 'y';\nexport const z = 1;"),
  ]);
  assert_code(&out, "const x = 'x';\nconsole.log(x);\n");
}

#[test]
fn import_cycles_terminate() {
  let out = code(&[
    (
      "/main.js",
      "import { isEven } from './even';\nconsole.log(isEven(4));",
    ),
    (
      "/even.js",
      "import { isOdd } from './odd';\nexport function isEven(n) { return n === 0 || isOdd(n - 1); }",
    ),
    (
      "/odd.js",
      "import { isEven } from './even';\nexport function isOdd(n) { return n !== 0 && isEven(n - 1); }",
    ),
  ]);
  assert_code(
    &out,
    "function isOdd(n) { return n !== 0 && isEven(n - 1); }\nfunction isEven(n) { return n === 0 || isOdd(n - 1); }\nconsole.log(isEven(4));\n",
  );
}

#[test]
fn plan_lists_included_statements() {
  let bundle = build(&[
    ("/main.js", "import { a } from './a';\nconsole.log(a);"),
    ("/a.js", "export const a = 1;\nexport const b = 2;"),
  ]);
  let plan = bundle.plan();
  assert_eq!(plan.modules.len(), 2);
  assert_eq!(plan.modules[0].statements.len(), 1);
  assert_eq!(plan.modules[0].statements[0].defines, vec!["a"]);
  assert_eq!(plan.modules[1].statements[0].index, 1);
  assert_eq!(plan.modules[1].statements[0].depends_on, vec!["console", "a"]);
  let json = serde_json::to_value(&plan).unwrap();
  assert_eq!(json["entry"], "/main.js");
}
