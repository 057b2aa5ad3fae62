use std::rc::Rc;

use crate::internal::{TokenKind as T, *};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
  Add,
  Sub,
  Mul,
  Div,
  Mod,
  Less,
  Greater,
  Eq,
  NotEq,
  And,
  Or,
}

impl BinOp {
  pub const fn symbol(self) -> &'static str {
    match self {
      BinOp::Add => "+",
      BinOp::Sub => "-",
      BinOp::Mul => "*",
      BinOp::Div => "/",
      BinOp::Mod => "%",
      BinOp::Less => "<",
      BinOp::Greater => ">",
      BinOp::Eq => "==",
      BinOp::NotEq => "!=",
      BinOp::And => "&&",
      BinOp::Or => "||",
    }
  }

  pub const fn additive(kind: TokenKind) -> Option<Self> {
    match kind {
      T::Plus => Some(BinOp::Add),
      T::Minus => Some(BinOp::Sub),
      _ => None,
    }
  }

  pub const fn multiplicative(kind: TokenKind) -> Option<Self> {
    match kind {
      T::Mul => Some(BinOp::Mul),
      T::Div => Some(BinOp::Div),
      T::Mod => Some(BinOp::Mod),
      _ => None,
    }
  }

  pub const fn boolean(kind: TokenKind) -> Option<Self> {
    match kind {
      T::EqEq => Some(BinOp::Eq),
      T::NotEq => Some(BinOp::NotEq),
      T::Greater => Some(BinOp::Greater),
      T::Less => Some(BinOp::Less),
      T::And => Some(BinOp::And),
      T::Or => Some(BinOp::Or),
      _ => None,
    }
  }
}

/// A function's name. Owned by its declaration, shared with every call site.
#[derive(Debug, PartialEq, Eq)]
pub struct Ident {
  pub name: String,
}

impl Ident {
  pub fn new(name: impl Into<String>) -> Rc<Self> {
    Rc::new(Ident { name: name.into() })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  IntLit(u64),
  Binary {
    op: BinOp,
    lhs: Box<Node>,
    rhs: Box<Node>,
  },
  Not(Box<Node>),
  Var(String),
  Assign {
    name: String,
    value: Box<Node>,
  },
  /// `stmt ; rest`
  Seq {
    stmt: Box<Node>,
    rest: Box<Node>,
  },
  Return(Box<Node>),
  Call {
    callee: Rc<Ident>,
    args: Vec<Node>,
  },
  /// `if (cond) { .. } { .. }` in statement position
  Cond {
    cond: Box<Node>,
    then: Box<Node>,
    otherwise: Box<Node>,
  },
  /// `if (cond) { expr } { expr }` in expression position
  Ternary {
    cond: Box<Node>,
    then: Box<Node>,
    otherwise: Box<Node>,
  },
  Block(Box<Node>),
}

impl Node {
  pub fn binary(op: BinOp, lhs: Node, rhs: Node) -> Node {
    Node::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    }
  }

  pub fn not(operand: Node) -> Node {
    Node::Not(Box::new(operand))
  }

  pub fn var(name: impl Into<String>) -> Node {
    Node::Var(name.into())
  }

  pub fn assign(name: impl Into<String>, value: Node) -> Node {
    Node::Assign {
      name: name.into(),
      value: Box::new(value),
    }
  }

  pub fn seq(stmt: Node, rest: Node) -> Node {
    Node::Seq {
      stmt: Box::new(stmt),
      rest: Box::new(rest),
    }
  }

  pub fn ret(expr: Node) -> Node {
    Node::Return(Box::new(expr))
  }

  pub fn cond(cond: Node, then: Node, otherwise: Node) -> Node {
    Node::Cond {
      cond: Box::new(cond),
      then: Box::new(then),
      otherwise: Box::new(otherwise),
    }
  }

  pub fn ternary(cond: Node, then: Node, otherwise: Node) -> Node {
    Node::Ternary {
      cond: Box::new(cond),
      then: Box::new(then),
      otherwise: Box::new(otherwise),
    }
  }

  pub fn block(body: Node) -> Node {
    Node::Block(Box::new(body))
  }
}

#[derive(Debug, PartialEq, Eq)]
pub struct FnDecl {
  pub ident: Rc<Ident>,
  pub params: Vec<String>,
  /// Always a `Node::Block`.
  pub body: Node,
}

impl FnDecl {
  pub fn label(&self) -> &str {
    &self.ident.name
  }

  pub fn is_entry(&self) -> bool {
    self.label() == ENTRY_LABEL
  }
}
