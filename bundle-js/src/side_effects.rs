use derive_visitor::Drive;
use derive_visitor::Visitor;
use parse_js::ast::class_or_object::ClassMember;
use parse_js::ast::class_or_object::ClassOrObjKey;
use parse_js::ast::class_or_object::ClassOrObjVal;
use parse_js::ast::expr::BinaryExpr;
use parse_js::ast::expr::CallExpr;
use parse_js::ast::expr::Expr;
use parse_js::ast::expr::ImportExpr;
use parse_js::ast::expr::TaggedTemplateExpr;
use parse_js::ast::expr::UnaryExpr;
use parse_js::ast::expr::UnaryPostfixExpr;
use parse_js::ast::func::Func;
use parse_js::ast::node::Node;
use parse_js::ast::stmt::Stmt;

type BinaryExprNode = Node<BinaryExpr>;
type CallExprNode = Node<CallExpr>;
type FuncNode = Node<Func>;
type ImportExprNode = Node<ImportExpr>;
type TaggedTemplateExprNode = Node<TaggedTemplateExpr>;
type UnaryExprNode = Node<UnaryExpr>;
type UnaryPostfixExprNode = Node<UnaryPostfixExpr>;

// Looks for anything that could run code or mutate state when the subtree is evaluated. Function
// bodies are not evaluated at definition time, so they are ignored.
#[derive(Default, Visitor)]
#[visitor(
  BinaryExprNode(enter),
  CallExprNode(enter),
  FuncNode(enter, exit),
  ImportExprNode(enter),
  TaggedTemplateExprNode(enter),
  UnaryExprNode(enter),
  UnaryPostfixExprNode(enter)
)]
struct EffectVisitor {
  func_depth: usize,
  impure: bool,
}

impl EffectVisitor {
  fn flag(&mut self) {
    if self.func_depth == 0 {
      self.impure = true;
    };
  }

  fn enter_binary_expr_node(&mut self, node: &BinaryExprNode) {
    if node.stx.operator.is_assignment() {
      self.flag();
    };
  }

  fn enter_call_expr_node(&mut self, _: &CallExprNode) {
    self.flag();
  }

  fn enter_func_node(&mut self, _: &FuncNode) {
    self.func_depth += 1;
  }

  fn exit_func_node(&mut self, _: &FuncNode) {
    self.func_depth -= 1;
  }

  fn enter_import_expr_node(&mut self, _: &ImportExprNode) {
    self.flag();
  }

  fn enter_tagged_template_expr_node(&mut self, _: &TaggedTemplateExprNode) {
    self.flag();
  }

  fn enter_unary_expr_node(&mut self, node: &UnaryExprNode) {
    if node.stx.operator.is_effectful_unary() {
      self.flag();
    };
  }

  fn enter_unary_postfix_expr_node(&mut self, _: &UnaryPostfixExprNode) {
    self.flag();
  }
}

fn is_pure<T: Drive>(node: &T) -> bool {
  let mut visitor = EffectVisitor::default();
  node.drive(&mut visitor);
  !visitor.impure
}

pub fn expr_is_pure(expr: &Node<Expr>) -> bool {
  is_pure(expr)
}

// Only the heritage, computed keys, and static field initialisers run when a class is defined.
fn class_is_pure(extends: Option<&Node<Expr>>, members: &[Node<ClassMember>]) -> bool {
  extends.map_or(true, expr_is_pure)
    && members.iter().all(|member| {
      let key_pure = match &member.stx.key {
        ClassOrObjKey::Direct(_) => true,
        ClassOrObjKey::Computed(key) => expr_is_pure(key),
      };
      let val_pure = match &member.stx.val {
        ClassOrObjVal::Prop(Some(init)) if member.stx.static_ => expr_is_pure(init),
        _ => true,
      };
      key_pure && val_pure
    })
}

/// Whether a top-level statement can be dropped when nothing it defines is used.
pub fn is_removable(stmt: &Node<Stmt>) -> bool {
  match stmt.stx.as_ref() {
    Stmt::FunctionDecl(_) | Stmt::Import(_) | Stmt::ExportList(_) | Stmt::Empty(_) => true,
    Stmt::ClassDecl(decl) => class_is_pure(decl.stx.extends.as_ref(), &decl.stx.members),
    Stmt::VarDecl(decl) => decl.stx.declarators.iter().all(|declarator| {
      is_pure(&declarator.pattern)
        && declarator
          .initializer
          .as_ref()
          .map_or(true, expr_is_pure)
    }),
    Stmt::ExportDefaultExpr(stmt) => expr_is_pure(&stmt.stx.expression),
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::is_removable;
  use parse_js::parse;

  fn removable(source: &str) -> Vec<bool> {
    parse(source)
      .unwrap()
      .stx
      .body
      .iter()
      .map(is_removable)
      .collect()
  }

  #[test]
  fn declarations_without_effects_are_removable() {
    assert_eq!(
      removable(
        "function f() { sideEffect(); }\nconst a = 1, b = { c: [a, () => g()] };\nlet d = a.b.c;\nclass A extends B { m() { h(); } x = i(); }"
      ),
      vec![true, true, true, true]
    );
  }

  #[test]
  fn definition_time_effects_keep_statements() {
    assert_eq!(
      removable(
        "const a = f();\nlet b = new C();\nvar c = d = 1;\nlet e = x++;\nconst t = tag`x`;\nclass D extends mixin(E) {}\nclass F { static y = g(); }\nclass G { [k()]() {} }\nconst { h = i() } = j;\nconst m = import('./m');"
      ),
      vec![false; 10]
    );
  }

  #[test]
  fn expression_statements_are_never_removable() {
    assert_eq!(
      removable("a;\nif (x) {}\nexport default 1 + 2;\nexport default f();"),
      vec![false, false, true, false]
    );
  }
}
