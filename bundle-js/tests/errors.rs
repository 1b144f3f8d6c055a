use bundle_js::Bundle;
use bundle_js::BundleError;
use common::options;

mod common;

fn build_err(modules: &[(&str, &str)]) -> BundleError {
  match Bundle::build("/main.js", options(modules)) {
    Ok(_) => panic!("expected the build to fail"),
    Err(err) => err,
  }
}

#[test]
fn duplicate_imports_are_rejected() {
  let err = build_err(&[
    (
      "/main.js",
      "import { a } from './x';\nimport { b as a } from './y';",
    ),
    ("/x.js", "export const a = 1;"),
    ("/y.js", "export const b = 2;"),
  ]);
  match &err {
    BundleError::DuplicateImport {
      path,
      name,
      location,
    } => {
      assert_eq!(path.to_string_lossy(), "/main.js");
      assert_eq!(name, "a");
      assert_eq!(location.line, 2);
    }
    other => panic!("unexpected error {other}"),
  };
  assert!(err.to_string().starts_with("/main.js:2:"));
}

#[test]
fn imports_cannot_be_reassigned() {
  let err = build_err(&[
    ("/main.js", "import { a } from './x';\na = 2;"),
    ("/x.js", "export let a = 1;"),
  ]);
  assert!(matches!(err, BundleError::IllegalReassignment { ref name, .. } if name == "a"));
  assert_eq!(
    err.to_string(),
    "/main.js:2:1: illegal reassignment to import 'a'"
  );
}

#[test]
fn namespace_members_cannot_be_assigned() {
  let err = build_err(&[
    ("/main.js", "import * as ns from './m';\nns.x = 2;\nconsole.log(ns.x);"),
    ("/m.js", "export const x = 1;"),
  ]);
  assert_eq!(
    err.to_string(),
    "/main.js:2:1: illegal reassignment to import 'ns'"
  );
}

#[test]
fn imported_members_cannot_be_assigned() {
  let err = build_err(&[
    ("/main.js", "import { config } from './config';\nfunction f() {\n  config.debug = true;\n}"),
    ("/config.js", "export const config = {};"),
  ]);
  assert_eq!(
    err.to_string(),
    "/main.js:3:3: illegal reassignment to import 'config'"
  );
}

#[test]
fn exports_must_be_defined() {
  let err = build_err(&[("/main.js", "export { missing };")]);
  assert!(matches!(err, BundleError::UnresolvedExport { ref name, .. } if name == "missing"));
}

#[test]
fn parse_errors_name_the_module() {
  let err = build_err(&[
    ("/main.js", "import { a } from './broken';\nconsole.log(a);"),
    ("/broken.js", "export const = 1;"),
  ]);
  match err {
    BundleError::Parse { path, location, .. } => {
      assert_eq!(path.to_string_lossy(), "/broken.js");
      assert_eq!(location.line, 1);
    }
    other => panic!("unexpected error {other}"),
  };
}

#[test]
fn missing_files_are_io_errors() {
  let err = build_err(&[("/main.js", "import './nowhere';")]);
  assert!(matches!(err, BundleError::Io { ref path, .. } if path.to_string_lossy() == "/nowhere.js"));
  assert_eq!(err.path().to_string_lossy(), "/nowhere.js");
}
