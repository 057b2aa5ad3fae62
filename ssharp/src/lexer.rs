use crate::internal::{TokenKind as T, *};

#[derive(Debug)]
pub struct Lexer<'a> {
  src: &'a str,
  pending: String,
  tokens: Vec<Token>,
}

/// Set when a flushed lexeme cannot be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Malformed;

impl<'a> Lexer<'a> {
  pub fn new(src: &'a str) -> Self {
    Lexer {
      src,
      pending: String::with_capacity(16),
      tokens: Vec::with_capacity(64),
    }
  }

  /// Scans the whole input. On the first unclassifiable lexeme every token
  /// produced so far is dropped and the result is a single `Malformed` token.
  #[instrument(skip_all)]
  pub fn lex(mut self) -> Vec<Token> {
    match self.scan() {
      Ok(()) => self.tokens,
      Err(Malformed) => {
        debug!(lexeme = %self.pending, "malformed lexeme, discarding token stream");
        vec![Token::malformed()]
      }
    }
  }

  fn scan(&mut self) -> Result<(), Malformed> {
    let src = self.src;
    for c in src.chars() {
      match c {
        c if is_space(c) => self.flush()?,
        '=' | '!' | '&' | '|' => {
          if !self.pending.starts_with(is_operator_lead) {
            self.flush()?;
          }
          self.pending.push(c);
          if matches!(self.pending.as_str(), "==" | "!=" | "&&" | "||") {
            self.flush()?;
          }
        }
        '+' => self.punct(T::Plus)?,
        '-' => self.punct(T::Minus)?,
        '*' => self.punct(T::Mul)?,
        '/' => self.punct(T::Div)?,
        '%' => self.punct(T::Mod)?,
        '>' => self.punct(T::Greater)?,
        '<' => self.punct(T::Less)?,
        '~' => self.punct(T::Not)?,
        '(' => self.punct(T::LParen)?,
        ')' => self.punct(T::RParen)?,
        ';' => self.punct(T::Semicolon)?,
        ',' => self.punct(T::Comma)?,
        '{' => self.punct(T::LBrace)?,
        '}' => self.punct(T::RBrace)?,
        c => {
          if !is_letters(&self.pending) && !is_digits(&self.pending) {
            self.flush()?;
          }
          self.pending.push(c);
        }
      }
    }
    self.flush()
  }

  fn punct(&mut self, kind: TokenKind) -> Result<(), Malformed> {
    self.flush()?;
    self.tokens.push(Token::new(kind));
    Ok(())
  }

  fn flush(&mut self) -> Result<(), Malformed> {
    if self.pending.is_empty() {
      return Ok(());
    }
    let token = match self.pending.as_str() {
      "=" => Token::new(T::Assign),
      "==" => Token::new(T::EqEq),
      "!=" => Token::new(T::NotEq),
      "&&" => Token::new(T::And),
      "||" => Token::new(T::Or),
      "if" => Token::new(T::If),
      lexeme if is_letters(lexeme) => Token::ident(lexeme),
      lexeme => match lexeme.parse::<u64>() {
        Ok(value) if is_digits(lexeme) => Token::int(value),
        _ => return Err(Malformed),
      },
    };
    trace!(%token, "flush");
    self.tokens.push(token);
    self.pending.clear();
    Ok(())
  }
}

pub fn tokenize(src: &str) -> Vec<Token> {
  Lexer::new(src).lex()
}

const fn is_space(c: char) -> bool {
  matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

const fn is_operator_lead(c: char) -> bool {
  matches!(c, '=' | '!' | '&' | '|')
}

fn is_letters(s: &str) -> bool {
  s.bytes().all(|b| b.is_ascii_lowercase())
}

fn is_digits(s: &str) -> bool {
  s.bytes().all(|b| b.is_ascii_digit())
}
