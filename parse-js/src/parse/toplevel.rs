use super::expr::pat::ParsePatternRules;
use super::ParseCtx;
use super::Parser;
use crate::ast::node::Node;
use crate::ast::stx::TopLevel;
use crate::error::SyntaxResult;
use crate::token::TT;

impl<'a> Parser<'a> {
  /// Parses the whole source as an ES module.
  pub fn parse_top_level(&mut self) -> SyntaxResult<Node<TopLevel>> {
    // Module code is strict and allows top-level await.
    let ctx = ParseCtx {
      rules: ParsePatternRules {
        await_allowed: false,
        yield_allowed: false,
      },
    };
    let body = self.stmts(ctx, TT::EOF)?;
    self.require(TT::EOF)?;
    let comments = self.take_comments();
    Ok(Node::new(self.source_range(), TopLevel { body, comments }))
  }
}
