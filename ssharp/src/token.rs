use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Not,
  Mul,
  Div,
  Mod,
  Plus,
  Minus,
  Less,
  Greater,
  EqEq,
  NotEq,
  And,
  Or,
  LParen,
  RParen,
  LBrace,
  RBrace,
  Comma,
  Semicolon,
  If,
  IntLit,
  Ident,
  Assign,
  Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
  None,
  Int(u64),
  Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub payload: Payload,
}

impl Token {
  pub const fn new(kind: TokenKind) -> Self {
    Token { kind, payload: Payload::None }
  }

  pub const fn int(value: u64) -> Self {
    Token {
      kind: TokenKind::IntLit,
      payload: Payload::Int(value),
    }
  }

  pub fn ident(name: impl Into<String>) -> Self {
    Token {
      kind: TokenKind::Ident,
      payload: Payload::Name(name.into()),
    }
  }

  pub const fn malformed() -> Self {
    Self::new(TokenKind::Malformed)
  }

  pub fn name(&self) -> Option<&str> {
    match &self.payload {
      Payload::Name(name) => Some(name),
      _ => None,
    }
  }

  pub const fn int_value(&self) -> Option<u64> {
    match self.payload {
      Payload::Int(value) => Some(value),
      _ => None,
    }
  }

  pub fn is(&self, kind: TokenKind) -> bool {
    self.kind == kind
  }
}

impl TokenKind {
  /// Source text of a payload-free token.
  pub const fn lexeme(self) -> &'static str {
    match self {
      TokenKind::Not => "~",
      TokenKind::Mul => "*",
      TokenKind::Div => "/",
      TokenKind::Mod => "%",
      TokenKind::Plus => "+",
      TokenKind::Minus => "-",
      TokenKind::Less => "<",
      TokenKind::Greater => ">",
      TokenKind::EqEq => "==",
      TokenKind::NotEq => "!=",
      TokenKind::And => "&&",
      TokenKind::Or => "||",
      TokenKind::LParen => "(",
      TokenKind::RParen => ")",
      TokenKind::LBrace => "{",
      TokenKind::RBrace => "}",
      TokenKind::Comma => ",",
      TokenKind::Semicolon => ";",
      TokenKind::If => "if",
      TokenKind::Assign => "=",
      TokenKind::IntLit | TokenKind::Ident | TokenKind::Malformed => "",
    }
  }
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.payload {
      Payload::Int(value) => write!(f, "{value}"),
      Payload::Name(name) => f.write_str(name),
      Payload::None if self.kind == TokenKind::Malformed => f.write_str("<malformed>"),
      Payload::None => f.write_str(self.kind.lexeme()),
    }
  }
}
