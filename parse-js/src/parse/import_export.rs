use super::expr::pat::is_valid_pattern_identifier;
use super::expr::Asi;
use super::stmt::decl::VarDeclParseMode;
use super::ParseCtx;
use super::Parser;
use crate::ast::expr::pat::IdPat;
use crate::ast::expr::pat::Pat;
use crate::ast::expr::Expr;
use crate::ast::expr::ImportExpr;
use crate::ast::expr::ImportMeta;
use crate::ast::import_export::ExportName;
use crate::ast::import_export::ExportNames;
use crate::ast::import_export::ImportName;
use crate::ast::import_export::ImportNames;
use crate::ast::import_export::ModuleExportImportName;
use crate::ast::node::Node;
use crate::ast::stmt::decl::PatDecl;
use crate::ast::stmt::ExportDefaultExprStmt;
use crate::ast::stmt::ExportListStmt;
use crate::ast::stmt::ImportStmt;
use crate::ast::stmt::Stmt;
use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::KEYWORDS_MAPPING;
use crate::token::TT;

impl<'a> Parser<'a> {
  /// Parses a name in an import or export clause. Any identifier name is allowed, including reserved words, as well as string literals.
  fn module_export_import_name(&mut self) -> SyntaxResult<ModuleExportImportName> {
    let t = self.peek();
    if t.typ == TT::LiteralString {
      return Ok(ModuleExportImportName::Str(self.lit_str_val()?));
    };
    if t.typ == TT::Identifier || KEYWORDS_MAPPING.contains_key(&t.typ) {
      self.consume();
      return Ok(ModuleExportImportName::Ident(self.string(t.loc)));
    };
    Err(t.error(SyntaxErrorType::ExpectedSyntax("import or export name")))
  }

  fn import_name(&mut self, ctx: ParseCtx) -> SyntaxResult<ImportName> {
    let t = self.peek();
    let importable = self.module_export_import_name()?;
    let alias = if self.consume_if(TT::KeywordAs).is_match() {
      self.id_pat_decl(ctx)?
    } else {
      match &importable {
        // `import { a }` behaves like `import { a as a }`.
        ModuleExportImportName::Ident(name) if is_valid_pattern_identifier(t.typ, ctx.rules) => {
          Node::new(t.loc, IdPat { name: name.clone() })
            .into_wrapped::<Pat>()
            .wrap(|pat| PatDecl { pat })
        }
        // Strings and reserved words such as `default` can't be local bindings.
        _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("`as` alias"))),
      }
    };
    Ok(ImportName { importable, alias })
  }

  fn export_name(&mut self) -> SyntaxResult<ExportName> {
    let exportable = self.module_export_import_name()?;
    let alias = self
      .consume_if(TT::KeywordAs)
      .and_then(|| self.module_export_import_name())?
      .unwrap_or_else(|| exportable.clone());
    Ok(ExportName { exportable, alias })
  }

  /// Parses `import(specifier)`.
  pub fn import_call(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ImportExpr>> {
    self.with_loc(|p| {
      p.require(TT::KeywordImport)?;
      p.require(TT::ParenthesisOpen)?;
      let module = p.expr(ctx, [TT::Comma, TT::ParenthesisClose])?;
      let _ = p.consume_if(TT::Comma);
      p.require(TT::ParenthesisClose)?;
      Ok(ImportExpr { module })
    })
  }

  pub fn import_meta(&mut self) -> SyntaxResult<Node<ImportMeta>> {
    self.with_loc(|p| {
      p.require(TT::KeywordImport)?;
      p.require(TT::Dot)?;
      let prop = p.require(TT::Identifier)?;
      if p.str(prop.loc) != "meta" {
        return Err(prop.error(SyntaxErrorType::ExpectedSyntax("`meta` property")));
      };
      Ok(ImportMeta {})
    })
  }

  /// Parses an import statement like:
  /// - `import "module"`
  /// - `import * as b from "module"`
  /// - `import {"b" as c, d, e as f, default as g} from "module"`
  /// - `import a from "module"`
  /// - `import a, * as b from "module"`
  /// - `import a, {d, e as f} from "module"`
  pub fn import_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ImportStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordImport)?;
      if p.peek().typ == TT::LiteralString {
        let module = p.lit_str_val()?;
        p.require_semicolon_or_asi()?;
        return Ok(ImportStmt {
          default: None,
          names: None,
          module,
        });
      };
      let default = if is_valid_pattern_identifier(p.peek().typ, ctx.rules) {
        Some(p.id_pat_decl(ctx)?)
      } else {
        None
      };
      let names = if default.is_none() || p.consume_if(TT::Comma).is_match() {
        let t = p.consume();
        Some(match t.typ {
          TT::Asterisk => {
            p.require(TT::KeywordAs)?;
            ImportNames::All(p.id_pat_decl(ctx)?)
          }
          TT::BraceOpen => ImportNames::Specific(
            p.list_with_loc(TT::Comma, TT::BraceClose, |p| p.import_name(ctx))?,
          ),
          _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("import specifiers"))),
        })
      } else {
        None
      };
      p.require(TT::KeywordFrom)?;
      let module = p.lit_str_val()?;
      p.require_semicolon_or_asi()?;
      Ok(ImportStmt {
        default,
        names,
        module,
      })
    })
  }

  /// Parses the part of `export {a, b as c} [from "module"]` or `export * [as ns] from "module"` after `export`.
  fn export_list(&mut self) -> SyntaxResult<ExportListStmt> {
    let t = self.consume();
    let (names, from) = match t.typ {
      TT::BraceOpen => {
        let names = self.list_with_loc(TT::Comma, TT::BraceClose, |p| p.export_name())?;
        let from = self
          .consume_if(TT::KeywordFrom)
          .and_then(|| self.lit_str_val())?;
        if from.is_none() {
          // Only re-exports can name a string on the left-hand side.
          if let Some(name) = names
            .iter()
            .find(|n| matches!(n.stx.exportable, ModuleExportImportName::Str(_)))
          {
            return Err(SyntaxError::new(
              SyntaxErrorType::ExpectedSyntax("identifier"),
              name.loc,
              Some(TT::LiteralString),
            ));
          };
        };
        (ExportNames::Specific(names), from)
      }
      TT::Asterisk => {
        let alias = self
          .consume_if(TT::KeywordAs)
          .and_then(|| self.module_export_import_name())?;
        self.require(TT::KeywordFrom)?;
        (ExportNames::All(alias), Some(self.lit_str_val()?))
      }
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("export list"))),
    };
    self.require_semicolon_or_asi()?;
    Ok(ExportListStmt { names, from })
  }

  // Whether a `function` declaration starting at the next token has a name.
  fn next_func_is_named(&mut self, ctx: ParseCtx) -> bool {
    let [t0, t1, t2, t3] = self.peek_n();
    let mut rest = [t1, t2, t3].into_iter();
    if t0.typ == TT::KeywordAsync {
      rest.next();
    };
    let name = match rest.next() {
      Some(t) if t.typ == TT::Asterisk => rest.next(),
      t => t,
    };
    name.is_some_and(|t| is_valid_pattern_identifier(t.typ, ctx.rules))
  }

  /// Parses any statement starting with `export`. The returned statement's loc covers the `export` keyword, but a wrapped declaration's own loc starts at its first keyword.
  pub fn export_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Stmt>> {
    let start = self.checkpoint();
    self.require(TT::KeywordExport)?;
    let [t0, t1] = self.peek_n();
    let stmt: Stmt = match t0.typ {
      TT::BraceOpen | TT::Asterisk => {
        let list = self.export_list()?;
        Stmt::ExportList(Node::new(self.since_checkpoint(&start), list))
      }
      TT::KeywordVar | TT::KeywordConst => self.var_decl(ctx, true, VarDeclParseMode::Asi)?.into(),
      TT::KeywordLet if t1.typ == TT::BraceOpen || t1.typ == TT::BracketOpen || is_valid_pattern_identifier(t1.typ, ctx.rules) => {
        self.var_decl(ctx, true, VarDeclParseMode::Asi)?.into()
      }
      TT::KeywordAsync | TT::KeywordFunction => self.func_decl(ctx, true, false)?.into(),
      TT::KeywordClass => self.class_decl(ctx, true, false)?.into(),
      TT::KeywordDefault => {
        self.consume();
        let [t0, t1] = self.peek_n();
        let is_func = t0.typ == TT::KeywordFunction
          || (t0.typ == TT::KeywordAsync
            && t1.typ == TT::KeywordFunction
            && !t1.preceded_by_line_terminator);
        if is_func && self.next_func_is_named(ctx) {
          self.func_decl(ctx, true, true)?.into()
        } else if t0.typ == TT::KeywordClass && is_valid_pattern_identifier(t1.typ, ctx.rules) {
          self.class_decl(ctx, true, true)?.into()
        } else {
          let expression: Node<Expr> = if is_func {
            let func = self.func_expr(ctx)?.into_wrapped();
            let _ = self.consume_if(TT::Semicolon);
            func
          } else if t0.typ == TT::KeywordClass {
            let class = self.class_expr(ctx)?.into_wrapped();
            let _ = self.consume_if(TT::Semicolon);
            class
          } else {
            let mut asi = Asi::can();
            let expr = self.expr_with_asi(ctx, [TT::Semicolon], &mut asi)?;
            if !asi.did_end_with_asi {
              self.require(TT::Semicolon)?;
            };
            expr
          };
          Stmt::ExportDefaultExpr(Node::new(
            self.since_checkpoint(&start),
            ExportDefaultExprStmt { expression },
          ))
        }
      }
      _ => return Err(t0.error(SyntaxErrorType::ExpectedSyntax("exportable"))),
    };
    Ok(Node::new(self.since_checkpoint(&start), stmt))
  }
}
