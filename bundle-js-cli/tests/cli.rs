use assert_cmd::Command;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn bundle_js_cli() -> Command {
  assert_cmd::cargo::cargo_bin_cmd!("bundle-js")
}

fn write_project(dir: &Path) {
  std::fs::write(
    dir.join("main.js"),
    "import { add } from './math';\n// log it\nconsole.log(add(1, 2));\n",
  )
  .unwrap();
  std::fs::write(
    dir.join("math.js"),
    "export function add(a, b) { return a + b; }\nexport function sub(a, b) { return a - b; }\n",
  )
  .unwrap();
}

#[test]
fn bundles_to_stdout() {
  let dir = tempdir().unwrap();
  write_project(dir.path());

  let assert = bundle_js_cli()
    .timeout(Duration::from_secs(5))
    .arg(dir.path().join("main"))
    .assert()
    .success()
    .code(0);

  assert_eq!(
    String::from_utf8_lossy(&assert.get_output().stdout),
    "function add(a, b) { return a + b; }\n// log it\nconsole.log(add(1, 2));\n"
  );
  assert!(
    assert.get_output().stderr.is_empty(),
    "expected stderr to be empty, got: {}",
    String::from_utf8_lossy(&assert.get_output().stderr)
  );
}

#[test]
fn writes_output_file_without_comments() {
  let dir = tempdir().unwrap();
  write_project(dir.path());
  let out = dir.path().join("bundle.js");

  bundle_js_cli()
    .timeout(Duration::from_secs(5))
    .arg(dir.path().join("main.js"))
    .arg("--no-comments")
    .arg("-o")
    .arg(&out)
    .assert()
    .success();

  assert_eq!(
    std::fs::read_to_string(&out).unwrap(),
    "function add(a, b) { return a + b; }\nconsole.log(add(1, 2));\n"
  );
}

#[test]
fn prints_plan_as_json() {
  let dir = tempdir().unwrap();
  write_project(dir.path());

  let assert = bundle_js_cli()
    .timeout(Duration::from_secs(5))
    .arg(dir.path().join("main.js"))
    .arg("--plan")
    .assert()
    .success();

  let plan: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  assert_eq!(plan["modules"].as_array().unwrap().len(), 2);
  assert_eq!(plan["modules"][0]["statements"][0]["defines"][0], "add");
  assert_eq!(plan["modules"][1]["statements"][0]["index"], 1);
}

#[test]
fn requested_exports_are_kept() {
  let dir = tempdir().unwrap();
  std::fs::write(
    dir.path().join("lib.js"),
    "export const a = 1;\nexport const b = 2;\nexport const c = 3;\n",
  )
  .unwrap();

  let assert = bundle_js_cli()
    .timeout(Duration::from_secs(5))
    .arg(dir.path().join("lib.js"))
    .arg("--exports")
    .arg("a,c")
    .assert()
    .success();

  assert_eq!(
    String::from_utf8_lossy(&assert.get_output().stdout),
    "const a = 1;\nconst c = 3;\n"
  );
}

#[test]
fn reports_errors_on_stderr() {
  let dir = tempdir().unwrap();
  std::fs::write(
    dir.path().join("main.js"),
    "import { a } from './a';\na = 1;\n",
  )
  .unwrap();
  std::fs::write(dir.path().join("a.js"), "export let a = 0;\n").unwrap();

  let assert = bundle_js_cli()
    .timeout(Duration::from_secs(5))
    .arg(dir.path().join("main.js"))
    .assert()
    .failure()
    .code(1);

  assert!(assert.get_output().stdout.is_empty());
  let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
  assert!(stderr.starts_with("error: "), "got: {stderr}");
  assert!(stderr.contains("illegal reassignment to import 'a'"), "got: {stderr}");
}

#[test]
fn missing_entry_fails() {
  let dir = tempdir().unwrap();

  let assert = bundle_js_cli()
    .timeout(Duration::from_secs(5))
    .arg(dir.path().join("nope.js"))
    .assert()
    .failure()
    .code(1);

  let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
  assert!(stderr.contains("could not read"), "got: {stderr}");
}
