use crate::ast::expr::lit::LitTemplatePart;
use crate::ast::expr::pat::Pat;
use crate::ast::expr::Expr;
use crate::ast::import_export::ExportNames;
use crate::ast::import_export::ImportNames;
use crate::ast::import_export::ModuleExportImportName;
use crate::ast::node::Node;
use crate::ast::stmt::decl::VarDeclMode;
use crate::ast::stmt::Stmt;
use crate::ast::stx::TopLevel;
use crate::error::SyntaxErrorType;
use crate::parse;
use serde_json::json;
use serde_json::Value;
use similar::ChangeTag;
use similar::TextDiff;

fn parse_ok(source: &str) -> Node<TopLevel> {
  match parse(source) {
    Ok(ast) => ast,
    Err(err) => panic!("failed to parse {source:?}: {err:?}"),
  }
}

fn stmt_sources<'a>(source: &'a str, ast: &Node<TopLevel>) -> Vec<&'a str> {
  ast.stx.body.iter().map(|s| &source[s.loc.0..s.loc.1]).collect()
}

fn assert_json_eq(actual: &Value, expected: &Value) {
  if actual == expected {
    return;
  };
  let expected = serde_json::to_string_pretty(expected).unwrap();
  let actual = serde_json::to_string_pretty(actual).unwrap();
  let mut msg = String::new();
  for change in TextDiff::from_lines(&expected, &actual).iter_all_changes() {
    let sign = match change.tag() {
      ChangeTag::Delete => "-",
      ChangeTag::Insert => "+",
      ChangeTag::Equal => " ",
    };
    msg.push_str(&format!("{sign}{change}"));
  }
  panic!("syntax tree differs from expected:\n{msg}");
}

#[test]
fn statement_locs_cover_exact_source() {
  let source = "import a from \"a\";\nexport default 42;\nexport function f() {}\nlet x = 1\nx++;\n";
  let ast = parse_ok(source);
  assert_eq!(stmt_sources(source, &ast), vec![
    "import a from \"a\";",
    "export default 42;",
    "export function f() {}",
    "let x = 1",
    "x++;",
  ]);
}

#[test]
fn exported_declaration_loc_starts_at_keyword() {
  let source = "export const a = 1, b = 2;";
  let ast = parse_ok(source);
  let stmt = &ast.stx.body[0];
  assert_eq!(stmt.loc.0, 0);
  let Stmt::VarDecl(decl) = stmt.stx.as_ref() else {
    panic!("expected var decl, got {stmt:?}");
  };
  assert_eq!(&source[decl.loc.0..decl.loc.1], "const a = 1, b = 2;");
  assert!(decl.stx.export);
  assert_eq!(decl.stx.mode, VarDeclMode::Const);
  assert_eq!(decl.stx.declarators.len(), 2);
}

#[test]
fn export_default_forms() {
  let source = "export default function () {}\nexport default class Foo {}\nexport default async function named() {}\nexport default a + b\n";
  let ast = parse_ok(source);
  let body = &ast.stx.body;
  assert_eq!(body.len(), 4);
  match body[0].stx.as_ref() {
    Stmt::ExportDefaultExpr(e) => assert!(matches!(e.stx.expression.stx.as_ref(), Expr::Func(_))),
    other => panic!("expected default expression, got {other:?}"),
  };
  match body[1].stx.as_ref() {
    Stmt::ClassDecl(c) => {
      assert!(c.stx.export_default);
      assert_eq!(c.stx.name.stx.name, "Foo");
      assert_eq!(&source[c.loc.0..c.loc.1], "class Foo {}");
    }
    other => panic!("expected class decl, got {other:?}"),
  };
  match body[2].stx.as_ref() {
    Stmt::FunctionDecl(f) => {
      assert!(f.stx.export_default);
      assert!(f.stx.function.stx.async_);
      assert_eq!(f.stx.name.stx.name, "named");
    }
    other => panic!("expected function decl, got {other:?}"),
  };
  match body[3].stx.as_ref() {
    Stmt::ExportDefaultExpr(e) => {
      let expr = &e.stx.expression;
      assert_eq!(&source[expr.loc.0..expr.loc.1], "a + b");
    }
    other => panic!("expected default expression, got {other:?}"),
  };
}

#[test]
fn export_lists_and_reexports() {
  let ast = parse_ok("export { a, b as c, d as default };\nexport { x as \"y z\" } from './m';\nexport * from './all';\nexport * as ns from './ns';");
  let body = &ast.stx.body;
  let lists: Vec<_> = body
    .iter()
    .map(|s| match s.stx.as_ref() {
      Stmt::ExportList(l) => l,
      other => panic!("expected export list, got {other:?}"),
    })
    .collect();
  match &lists[0].stx.names {
    ExportNames::Specific(names) => {
      let pairs: Vec<_> = names
        .iter()
        .map(|n| (n.stx.exportable.as_str(), n.stx.alias.as_str()))
        .collect();
      assert_eq!(pairs, vec![("a", "a"), ("b", "c"), ("d", "default")]);
    }
    other => panic!("unexpected names {other:?}"),
  };
  assert_eq!(lists[0].stx.from, None);
  assert_eq!(lists[1].stx.from.as_deref(), Some("./m"));
  match &lists[1].stx.names {
    ExportNames::Specific(names) => {
      assert_eq!(names[0].stx.alias, ModuleExportImportName::Str("y z".into()))
    }
    other => panic!("unexpected names {other:?}"),
  };
  assert!(matches!(lists[2].stx.names, ExportNames::All(None)));
  assert!(
    matches!(&lists[3].stx.names, ExportNames::All(Some(ModuleExportImportName::Ident(n))) if n == "ns")
  );
}

#[test]
fn local_export_list_rejects_string_names() {
  let err = parse("export { \"a\" };").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::ExpectedSyntax("identifier"));
}

#[test]
fn import_statement_tree() {
  let ast = parse_ok("import a, { b as c, \"d e\" as f, default as g } from \"m\";");
  let actual = serde_json::to_value(&ast.stx.body[0]).unwrap();
  let id = |name: &str| json!({ "pat": { "$t": "Id", "name": name } });
  let expected = json!({
    "$t": "Import",
    "default": id("a"),
    "names": {
      "Specific": [
        { "importable": { "Ident": "b" }, "alias": id("c") },
        { "importable": { "Str": "d e" }, "alias": id("f") },
        { "importable": { "Ident": "default" }, "alias": id("g") },
      ]
    },
    "module": "m",
  });
  assert_json_eq(&actual, &expected);
}

#[test]
fn import_forms() {
  let ast = parse_ok("import 'side-effect'\nimport * as ns from './ns'\nimport def, * as all from './both'");
  let imports: Vec<_> = ast
    .stx
    .body
    .iter()
    .map(|s| match s.stx.as_ref() {
      Stmt::Import(i) => i,
      other => panic!("expected import, got {other:?}"),
    })
    .collect();
  assert_eq!(imports.len(), 3);
  assert!(imports[0].stx.default.is_none() && imports[0].stx.names.is_none());
  assert_eq!(imports[0].stx.module, "side-effect");
  assert!(matches!(imports[1].stx.names, Some(ImportNames::All(_))));
  assert!(imports[2].stx.default.is_some());
  assert!(matches!(imports[2].stx.names, Some(ImportNames::All(_))));
}

#[test]
fn import_specifier_requires_alias_for_reserved_names() {
  assert!(parse("import { default } from 'm';").is_err());
  assert!(parse("import { \"a b\" } from 'm';").is_err());
  assert!(parse("import { default as d, as } from 'm';").is_ok());
}

#[test]
fn automatic_semicolon_insertion() {
  let source = "let a = 1\nlet b = a\na\n++b\nreturn_()\n";
  let ast = parse_ok(source);
  assert_eq!(stmt_sources(source, &ast), vec![
    "let a = 1",
    "let b = a",
    "a",
    "++b",
    "return_()",
  ]);
}

#[test]
fn asi_does_not_split_continued_expressions() {
  let ast = parse_ok("let a = b\n  .c\n  .d()\n");
  assert_eq!(ast.stx.body.len(), 1);
}

#[test]
fn slash_is_division_after_operand_and_regex_elsewhere() {
  let ast = parse_ok("let x = a / b / c; let r = /ab+c/g;");
  let init = |i: usize| match ast.stx.body[i].stx.as_ref() {
    Stmt::VarDecl(decl) => decl.stx.declarators[0].initializer.as_ref().unwrap(),
    other => panic!("expected var decl, got {other:?}"),
  };
  assert!(matches!(init(0).stx.as_ref(), Expr::Binary(_)));
  match init(1).stx.as_ref() {
    Expr::LitRegex(r) => assert_eq!(r.stx.value, "/ab+c/g"),
    other => panic!("expected regex, got {other:?}"),
  };
}

#[test]
fn template_substitutions() {
  let ast = parse_ok("`a${b}c${`nested ${d}`}`;");
  let Stmt::Expr(stmt) = ast.stx.body[0].stx.as_ref() else {
    panic!("expected expression statement");
  };
  let Expr::LitTemplate(tpl) = stmt.stx.expr.stx.as_ref() else {
    panic!("expected template");
  };
  let subs = tpl
    .stx
    .parts
    .iter()
    .filter(|p| matches!(p, LitTemplatePart::Substitution(_)))
    .count();
  assert_eq!(subs, 2);
  assert!(matches!(&tpl.stx.parts[0], LitTemplatePart::String(s) if s == "a"));
}

#[test]
fn destructuring_declarations_and_assignments() {
  let ast = parse_ok("const { a, b: [c = 1, , ...d], ...e } = f;\n({ g, h: i = 2 } = j);\n[k, l] = [l, k];");
  assert_eq!(ast.stx.body.len(), 3);
  let Stmt::VarDecl(decl) = ast.stx.body[0].stx.as_ref() else {
    panic!("expected var decl");
  };
  let Pat::Obj(obj) = decl.stx.declarators[0].pattern.stx.pat.stx.as_ref() else {
    panic!("expected object pattern");
  };
  assert_eq!(obj.stx.properties.len(), 2);
  assert!(obj.stx.properties[0].stx.shorthand);
  assert!(!obj.stx.properties[1].stx.shorthand);
  assert_eq!(obj.stx.rest.as_ref().unwrap().stx.name, "e");
}

#[test]
fn for_loop_variants() {
  let ast = parse_ok("for (let i = 0; i < n; i++) {}\nfor (const k in o) ;\nfor (x of xs) f(x);\nfor (;;) break;");
  let kinds: Vec<_> = ast
    .stx
    .body
    .iter()
    .map(|s| match s.stx.as_ref() {
      Stmt::ForTriple(_) => "triple",
      Stmt::ForIn(_) => "in",
      Stmt::ForOf(_) => "of",
      other => panic!("expected for loop, got {other:?}"),
    })
    .collect();
  assert_eq!(kinds, vec!["triple", "in", "of", "triple"]);
}

#[test]
fn arrow_functions_and_async() {
  let ast = parse_ok("const f = async (a, { b }) => a + b;\nconst g = x => ({ x });\nconst async = 1;\nasync();");
  assert_eq!(ast.stx.body.len(), 4);
}

#[test]
fn classes_and_object_members() {
  parse_ok(
    "class A extends B {\n  static x = 1;\n  #y;\n  constructor() { super(); }\n  get z() { return this.#y; }\n  async *gen() {}\n  [computed]() {}\n}\nconst o = { a, b: 1, c() {}, get d() { return 1; }, ...e, 'f': 2, [g]: 3 };",
  );
}

#[test]
fn comments_are_collected_in_order() {
  let source = "// one\nlet a; /* two\n */ let b;";
  let ast = parse_ok(source);
  let comments = &ast.stx.comments;
  assert_eq!(comments.len(), 2);
  assert_eq!(&source[comments[0].loc.0..comments[0].loc.1], "// one");
  assert!(!comments[0].multiline);
  assert!(comments[1].multiline);
}

#[test]
fn syntax_errors() {
  assert_eq!(
    parse("throw\nx;").unwrap_err().typ,
    SyntaxErrorType::LineTerminatorAfterThrow
  );
  assert_eq!(
    parse("try {}").unwrap_err().typ,
    SyntaxErrorType::TryStatementHasNoCatchOrFinally
  );
  assert!(parse("let a = ;").is_err());
  assert!(parse("a b").is_err());
}
