use super::ParseCtx;
use super::Parser;
use crate::ast::func::Func;
use crate::ast::node::Node;
use crate::ast::stmt::decl::ClassDecl;
use crate::ast::stmt::decl::FuncDecl;
use crate::ast::stmt::decl::VarDecl;
use crate::ast::stmt::decl::VarDeclMode;
use crate::ast::stmt::decl::VarDeclarator;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::parse::expr::Asi;
use crate::token::TT;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum VarDeclParseMode {
  // Standard parsing mode for var/let/const statement.
  Asi,
  // Parse as many valid declarators as possible, then break before the first invalid token (i.e. not a comma). Used by for-loop parser.
  Leftmost,
}

impl<'a> Parser<'a> {
  pub fn var_decl_mode(&mut self) -> SyntaxResult<VarDeclMode> {
    let t = self.consume();
    Ok(match t.typ {
      TT::KeywordLet => VarDeclMode::Let,
      TT::KeywordConst => VarDeclMode::Const,
      TT::KeywordVar => VarDeclMode::Var,
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("variable declaration"))),
    })
  }

  /// Parses a variable declaration, which contains one or more declarators, each with an optional initializer. Examples of variable declarations:
  /// - `const a = 1`
  /// - `let a, b = 2, c`
  /// - `var { a, b: [c] } = d;`
  ///
  /// In `Asi` mode, the terminating semicolon is consumed and part of the node.
  pub fn var_decl(
    &mut self,
    ctx: ParseCtx,
    export: bool,
    parse_mode: VarDeclParseMode,
  ) -> SyntaxResult<Node<VarDecl>> {
    self.with_loc(|p| {
      let mode = p.var_decl_mode()?;
      let mut declarators = Vec::new();
      loop {
        let pattern = p.pat_decl(ctx)?;
        let mut asi = match parse_mode {
          VarDeclParseMode::Asi => Asi::can(),
          VarDeclParseMode::Leftmost => Asi::no(),
        };
        let initializer = match parse_mode {
          VarDeclParseMode::Asi => p
            .consume_if(TT::Equals)
            .and_then(|| p.expr_with_asi(ctx, [TT::Semicolon, TT::Comma], &mut asi))?,
          // In a for header, `in` ends the initializer.
          VarDeclParseMode::Leftmost => p.consume_if(TT::Equals).and_then(|| {
            p.expr_with_asi(ctx, [TT::Semicolon, TT::Comma, TT::KeywordIn], &mut asi)
          })?,
        };
        declarators.push(VarDeclarator {
          pattern,
          initializer,
        });
        match parse_mode {
          VarDeclParseMode::Asi => {
            if p.consume_if(TT::Semicolon).is_match() || asi.did_end_with_asi {
              break;
            }
            let t = p.peek();
            if t.typ == TT::EOF
              || t.typ == TT::BraceClose
              || (t.preceded_by_line_terminator && t.typ != TT::Comma)
            {
              break;
            };
            p.require(TT::Comma)?;
          }
          VarDeclParseMode::Leftmost => {
            if !p.consume_if(TT::Comma).is_match() {
              break;
            }
          }
        }
      }
      Ok(VarDecl {
        export,
        mode,
        declarators,
      })
    })
  }

  /// Parses `async? function *? name (...) {...}`. Any `export` prefix has already been consumed.
  pub fn func_decl(
    &mut self,
    ctx: ParseCtx,
    export: bool,
    export_default: bool,
  ) -> SyntaxResult<Node<FuncDecl>> {
    self.with_loc(|p| {
      let is_async = p.consume_if(TT::KeywordAsync).is_match();
      p.require(TT::KeywordFunction)?;
      let generator = p.consume_if(TT::Asterisk).is_match();
      let name = p.class_or_func_name(ctx)?;
      let function = p.with_loc(|p| {
        let parameters = p.func_params(ctx)?;
        let body = p.parse_func_block_body(ctx)?.into();
        Ok(Func {
          arrow: false,
          async_: is_async,
          generator,
          parameters,
          body,
        })
      })?;
      Ok(FuncDecl {
        export,
        export_default,
        name,
        function,
      })
    })
  }

  pub fn class_decl(
    &mut self,
    ctx: ParseCtx,
    export: bool,
    export_default: bool,
  ) -> SyntaxResult<Node<ClassDecl>> {
    self.with_loc(|p| {
      p.require(TT::KeywordClass)?;
      let name = p.class_or_func_name(ctx)?;
      let extends = p
        .consume_if(TT::KeywordExtends)
        .and_then(|| p.expr(ctx, [TT::BraceOpen]))?;
      let members = p.class_body(ctx)?;
      Ok(ClassDecl {
        export,
        export_default,
        name,
        extends,
        members,
      })
    })
  }
}
