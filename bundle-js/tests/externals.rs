use bundle_js::ExternalInfo;
use common::assert_code;
use common::build;

mod common;

fn external(specifier: &str, name: &str) -> ExternalInfo {
  ExternalInfo {
    specifier: specifier.to_string(),
    name: name.to_string(),
  }
}

#[test]
fn external_imports_read_from_one_variable() {
  let output = build(&[(
    "/main.js",
    "import { readFile } from 'fs';\nimport * as path from 'path';\nimport React from 'react';\nreadFile(path.join('a', 'b'));\nReact.render();",
  )])
  .generate()
  .unwrap();
  assert_code(
    &output.code,
    "fs.readFile(path.join('a', 'b'));\nReact.render();\n",
  );
  assert_eq!(output.externals, vec![
    external("fs", "fs"),
    external("path", "path"),
    external("react", "React"),
  ]);
}

#[test]
fn external_names_win_over_earlier_definers() {
  let output = build(&[
    ("/a.js", "export const fs = 'not the module';"),
    (
      "/main.js",
      "import { fs as localFs } from './a';\nimport { readFileSync } from 'fs';\nconsole.log(localFs, readFileSync('x'));",
    ),
  ])
  .generate()
  .unwrap();
  assert_code(
    &output.code,
    "const _fs = 'not the module';\nconsole.log(_fs, fs.readFileSync('x'));\n",
  );
  assert_eq!(output.externals, vec![external("fs", "fs")]);
}

#[test]
fn external_star_exports_forward_named_imports() {
  let output = build(&[
    ("/main.js", "import { map } from './reexport';\nmap([]);"),
    ("/reexport.js", "export * from 'lodash-es';"),
  ])
  .generate()
  .unwrap();
  assert_code(&output.code, "lodashEs.map([]);\n");
  assert_eq!(output.externals, vec![external("lodash-es", "lodashEs")]);
}

#[test]
fn namespace_suggestions_name_the_external() {
  let output = build(&[(
    "/main.js",
    "import lib from 'some-lib';\nimport * as ns from 'some-lib';\nlib(ns.x);",
  )])
  .generate()
  .unwrap();
  assert_code(&output.code, "ns(ns.x);\n");
  assert_eq!(output.externals, vec![external("some-lib", "ns")]);
}
