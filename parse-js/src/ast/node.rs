use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::loc::Loc;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;
use serde::Serializer;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;

#[derive(Drive, DriveMut)]
pub struct Node<S: Drive + DriveMut> {
  // Byte range of the node in the source. Statement and declaration ranges are exact, so callers
  // can slice the original text with them.
  #[drive(skip)]
  pub loc: Loc,
  pub stx: Box<S>,
}

impl<S: Drive + DriveMut> Node<S> {
  pub fn new(loc: Loc, stx: S) -> Node<S> {
    Node {
      loc,
      stx: Box::new(stx),
    }
  }

  pub fn into_stx<T: From<S> + Drive + DriveMut>(self) -> Node<T> {
    Node {
      loc: self.loc,
      stx: Box::new(T::from(*self.stx)),
    }
  }

  /// Maps the syntax, keeping the location.
  pub fn map_stx<T: Drive + DriveMut, F: FnOnce(S) -> T>(self, f: F) -> Node<T> {
    Node {
      loc: self.loc,
      stx: Box::new(f(*self.stx)),
    }
  }

  /// Wraps the node inside another node with the same loc, with syntax derived from the provided callback.
  pub fn wrap<T: Drive + DriveMut, F: FnOnce(Node<S>) -> T>(self, f: F) -> Node<T> {
    let loc = self.loc;
    let stx = f(self);
    Node::new(loc, stx)
  }

  /// Wraps the node as a variant of `T`, e.g. `Node<IdExpr>` into `Node<Expr>`.
  pub fn into_wrapped<T: From<Node<S>> + Drive + DriveMut>(self) -> Node<T> {
    self.wrap(T::from)
  }

  /// Create an error at this node's location.
  pub fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    self.loc.error(typ, None)
  }
}

impl<S: Debug + Drive + DriveMut> Debug for Node<S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    self.stx.fmt(f)
  }
}

impl<S: Serialize + Drive + DriveMut> Serialize for Node<S> {
  fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
    self.stx.serialize(serializer)
  }
}
