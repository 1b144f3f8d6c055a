use common::assert_code;
use common::code;

mod common;

#[test]
fn namespace_imports_get_an_object() {
  let out = code(&[
    (
      "/main.js",
      "import * as math from './math';\nconsole.log(math.add(1, 2));",
    ),
    (
      "/math.js",
      "export function add(a, b) { return a + b; }\nexport const PI = 3.14;",
    ),
  ]);
  assert_code(
    &out,
    "function add(a, b) { return a + b; }\nconst PI = 3.14;\nvar math = {\n  get add () { return add; },\n  get PI () { return PI; }\n};\nconsole.log(math.add(1, 2));\n",
  );
}

#[test]
fn namespace_objects_follow_reexports() {
  let out = code(&[
    (
      "/main.js",
      "import * as api from './api';\nconsole.log(api);",
    ),
    ("/api.js", "export { one as first } from './one';\nexport * from './two';"),
    ("/one.js", "export const one = 1;"),
    ("/two.js", "export const two = 2;"),
  ]);
  assert_code(
    &out,
    "const one = 1;\nconst two = 2;\nvar api = {\n  get first () { return one; },\n  get two () { return two; }\n};\nconsole.log(api);\n",
  );
}

#[test]
fn namespace_names_avoid_collisions() {
  let out = code(&[
    (
      "/main.js",
      "import * as util from './util';\nconst util2 = util;\nexport { util2 as util };",
    ),
    ("/util.js", "export const util = 'u';"),
  ]);
  assert_code(
    &out,
    "const util = 'u';\nvar _util = {\n  get util () { return util; }\n};\nconst util2 = _util;\n",
  );
}
