use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::internal::{TokenKind as T, *};

/// A matched production and the position just past it. Positions are plain
/// values, so a failed alternative leaves the caller's cursor untouched.
type Parsed<N> = Option<(N, usize)>;

type ParseFn<'t> = fn(&Parser<'t>, usize) -> Parsed<Node>;
type OperatorFn = fn(TokenKind) -> Option<BinOp>;

/// Productions whose results are cached by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Rule {
  Body,
  Add,
}

#[derive(Debug)]
pub struct Parser<'t> {
  tokens: &'t [Token],
  fns: FnTable,
  // valid for one declaration: the table only changes between them
  memo: RefCell<HashMap<(Rule, usize), Parsed<Node>>>,
}

impl<'t> Parser<'t> {
  pub fn new(tokens: &'t [Token]) -> Self {
    #[cfg(test)]
    configure_test_tracing();

    Parser {
      tokens,
      fns: FnTable::new(),
      memo: RefCell::new(HashMap::new()),
    }
  }

  /// Parses function declarations until the tokens run out.
  #[instrument(skip_all)]
  pub fn parse(mut self) -> CompileResult<FnTable> {
    trace!("Parser::parse()");
    let mut pos = 0;
    while pos < self.tokens.len() {
      let Some(next) = self.parse_fn_decl(pos) else {
        debug!(pos, "tokens do not start a function declaration");
        return Err(CompileError::ParseExhaustion);
      };
      pos = next;
    }
    Ok(self.fns)
  }

  // label p1 .. pn { Body }
  #[instrument(skip(self))]
  fn parse_fn_decl(&mut self, pos: usize) -> Option<usize> {
    let tokens = self.tokens;
    let label = tokens.get(pos)?.name()?;
    let (params, body_pos) = scan_params(tokens, pos + 1);
    let ident = self.fns.declare(label, params.len())?;
    self.memo.get_mut().clear();
    match self.parse_block(body_pos) {
      Some((body, end)) => {
        debug!(label, arity = params.len(), "declared function");
        self.fns.define(FnDecl { ident, params, body });
        Some(end)
      }
      None => {
        self.fns.retract(label);
        None
      }
    }
  }

  // { Body }
  fn parse_block(&self, pos: usize) -> Parsed<Node> {
    let pos = self.expect(pos, T::LBrace)?;
    let (body, pos) = self.parse_body(pos)?;
    let pos = self.expect(pos, T::RBrace)?;
    Some((Node::block(body), pos))
  }

  fn parse_body(&self, pos: usize) -> Parsed<Node> {
    self.memoized(Rule::Body, pos, || self.parse_body_uncached(pos))
  }

  // Statement ; Body | AddExpr | Statement
  #[instrument(skip(self))]
  fn parse_body_uncached(&self, pos: usize) -> Parsed<Node> {
    let Some((stmt, after_stmt)) = self.parse_stmt(pos) else {
      return self.parse_add(pos).map(|(expr, end)| (Node::ret(expr), end));
    };
    if let Some(rest_pos) = self.expect(after_stmt, T::Semicolon) {
      if let Some((rest, end)) = self.parse_body(rest_pos) {
        return Some((Node::seq(stmt, rest), end));
      }
    }
    // a trailing expression only wins if it covers the whole statement
    match self.parse_add(pos) {
      Some((expr, end)) if end >= after_stmt => Some((Node::ret(expr), end)),
      _ => Some((stmt, after_stmt)),
    }
  }

  fn parse_stmt(&self, pos: usize) -> Parsed<Node> {
    self
      .parse_assign(pos)
      .or_else(|| self.parse_call(pos))
      .or_else(|| self.parse_cond(pos))
      .or_else(|| self.parse_block(pos))
  }

  // Variable = AddExpr
  fn parse_assign(&self, pos: usize) -> Parsed<Node> {
    let name = self.tokens.get(pos)?.name()?;
    let pos = self.expect(pos + 1, T::Assign)?;
    let (value, pos) = self.parse_add(pos)?;
    Some((Node::assign(name, value), pos))
  }

  // if ( BoolExpr ) { Body } { Body }
  fn parse_cond(&self, pos: usize) -> Parsed<Node> {
    let (cond, pos) = self.parse_guard(pos)?;
    let (then, pos) = self.parse_block(pos)?;
    let (otherwise, pos) = self.parse_block(pos)?;
    Some((Node::cond(cond, then, otherwise), pos))
  }

  // if ( BoolExpr ) { AddExpr } { AddExpr }
  fn parse_ternary(&self, pos: usize) -> Parsed<Node> {
    let (cond, pos) = self.parse_guard(pos)?;
    let (then, pos) = self.parse_delimited(pos, T::LBrace, T::RBrace)?;
    let (otherwise, pos) = self.parse_delimited(pos, T::LBrace, T::RBrace)?;
    Some((Node::ternary(cond, then, otherwise), pos))
  }

  // if ( BoolExpr )
  fn parse_guard(&self, pos: usize) -> Parsed<Node> {
    let pos = self.expect(pos, T::If)?;
    let pos = self.expect(pos, T::LParen)?;
    let (cond, pos) = self.parse_bool(pos)?;
    let pos = self.expect(pos, T::RParen)?;
    Some((cond, pos))
  }

  // ~ BoolExpr | AddExpr (op BoolExpr)?
  fn parse_bool(&self, pos: usize) -> Parsed<Node> {
    if let Some(pos) = self.expect(pos, T::Not) {
      return self
        .parse_bool(pos)
        .map(|(operand, end)| (Node::not(operand), end));
    }
    let (lhs, pos) = self.parse_add(pos)?;
    self.parse_infix(lhs, pos, BinOp::boolean, Self::parse_bool)
  }

  fn parse_add(&self, pos: usize) -> Parsed<Node> {
    self.memoized(Rule::Add, pos, || self.parse_add_uncached(pos))
  }

  fn parse_add_uncached(&self, pos: usize) -> Parsed<Node> {
    let (lhs, pos) = self.parse_mult(pos)?;
    self.parse_infix(lhs, pos, BinOp::additive, Self::parse_add)
  }

  fn parse_mult(&self, pos: usize) -> Parsed<Node> {
    let (lhs, pos) = self.parse_basic(pos)?;
    self.parse_infix(lhs, pos, BinOp::multiplicative, Self::parse_mult)
  }

  /// Extends `lhs` with `op rhs` when both are there, otherwise keeps `lhs`
  /// alone and leaves the operator unconsumed.
  fn parse_infix(
    &self,
    lhs: Node,
    pos: usize,
    op_for: OperatorFn,
    rhs_fn: ParseFn<'t>,
  ) -> Parsed<Node> {
    let Some(op) = self.tokens.get(pos).and_then(|token| op_for(token.kind)) else {
      return Some((lhs, pos));
    };
    match rhs_fn(self, pos + 1) {
      Some((rhs, end)) => Some((Node::binary(op, lhs, rhs), end)),
      None => Some((lhs, pos)),
    }
  }

  fn parse_basic(&self, pos: usize) -> Parsed<Node> {
    self
      .parse_int_lit(pos)
      .or_else(|| self.parse_call(pos))
      .or_else(|| self.parse_ternary(pos))
      .or_else(|| self.parse_var(pos))
      .or_else(|| self.parse_block(pos))
      .or_else(|| self.parse_delimited(pos, T::LParen, T::RParen))
  }

  // open AddExpr close
  fn parse_delimited(&self, pos: usize, open: TokenKind, close: TokenKind) -> Parsed<Node> {
    let pos = self.expect(pos, open)?;
    let (expr, pos) = self.parse_add(pos)?;
    let pos = self.expect(pos, close)?;
    Some((expr, pos))
  }

  fn parse_int_lit(&self, pos: usize) -> Parsed<Node> {
    let value = self.tokens.get(pos)?.int_value()?;
    Some((Node::IntLit(value), pos + 1))
  }

  fn parse_var(&self, pos: usize) -> Parsed<Node> {
    let name = self.tokens.get(pos)?.name()?;
    Some((Node::var(name), pos + 1))
  }

  // label ( AddExpr, .. ), resolved against the table right away
  #[instrument(skip(self))]
  fn parse_call(&self, pos: usize) -> Parsed<Node> {
    let label = self.tokens.get(pos)?.name()?;
    let sig = self.fns.lookup(label)?;
    let pos = self.expect(pos + 1, T::LParen)?;
    let (args, pos) = self.parse_args(pos)?;
    if args.len() != sig.arity {
      trace!(label, expected = sig.arity, found = args.len(), "arity mismatch");
      return None;
    }
    let callee = Rc::clone(&sig.ident);
    Some((Node::Call { callee, args }, pos))
  }

  // ) | AddExpr (, AddExpr)* )
  fn parse_args(&self, pos: usize) -> Parsed<Vec<Node>> {
    let mut args = Vec::new();
    if let Some(end) = self.expect(pos, T::RParen) {
      return Some((args, end));
    }
    let mut pos = pos;
    loop {
      let (arg, next) = self.parse_add(pos)?;
      args.push(arg);
      if let Some(next) = self.expect(next, T::Comma) {
        pos = next;
      } else {
        let end = self.expect(next, T::RParen)?;
        return Some((args, end));
      }
    }
  }

  /// Every production is a pure function of position within one
  /// declaration, so a result computed once can be handed out again.
  fn memoized(
    &self,
    rule: Rule,
    pos: usize,
    parse: impl FnOnce() -> Parsed<Node>,
  ) -> Parsed<Node> {
    if let Some(parsed) = self.memo.borrow().get(&(rule, pos)) {
      return parsed.clone();
    }
    let parsed = parse();
    self.memo.borrow_mut().insert((rule, pos), parsed.clone());
    parsed
  }

  fn expect(&self, pos: usize, kind: TokenKind) -> Option<usize> {
    self
      .tokens
      .get(pos)
      .filter(|token| token.is(kind))
      .map(|_| pos + 1)
  }
}

/// Gathers parameter names up to the opening brace of the body. Tokens
/// other than identifiers are skipped. Names come back sorted and unique.
fn scan_params(tokens: &[Token], mut pos: usize) -> (Vec<String>, usize) {
  let mut params = BTreeSet::new();
  while let Some(token) = tokens.get(pos) {
    if token.is(T::LBrace) {
      break;
    }
    if let Some(name) = token.name() {
      params.insert(name.to_string());
    }
    pos += 1;
  }
  (params.into_iter().collect(), pos)
}

#[cfg(test)]
static INIT: std::sync::Once = std::sync::Once::new();

#[cfg(test)]
fn configure_test_tracing() {
  use tracing_subscriber::fmt::format::FmtSpan;
  use tracing_subscriber::{EnvFilter, fmt};
  INIT.call_once(|| {
    let subscriber = fmt::Subscriber::builder()
      .with_env_filter(EnvFilter::from_default_env())
      .with_test_writer()
      .with_span_events(FmtSpan::ACTIVE)
      .finish();
    tracing::subscriber::set_global_default(subscriber)
      .expect("setting default tracing subscriber failed");
  });
}

#[cfg(test)]
mod tests {
  use super::*;
  use BinOp::*;
  use Node::IntLit;
  use pretty_assertions::assert_eq;

  fn parse(src: &str) -> CompileResult<FnTable> {
    let tokens = tokenize(src);
    Parser::new(&tokens).parse()
  }

  fn body_of(src: &str, label: &str) -> Node {
    let fns = parse(src).unwrap();
    let decl = fns.decls().iter().find(|decl| decl.label() == label).unwrap();
    let Node::Block(body) = &decl.body else {
      panic!("function body is not a block");
    };
    body.as_ref().clone()
  }

  fn call(label: &str, args: Vec<Node>) -> Node {
    Node::Call { callee: Ident::new(label), args }
  }

  #[test]
  fn entry_point_returning_sum() {
    assert_eq!(
      body_of("main { 1 + 2 }", "main"),
      Node::ret(Node::binary(Add, IntLit(1), IntLit(2)))
    );
  }

  #[test]
  fn multiplication_binds_tighter_than_addition() {
    assert_eq!(
      body_of("main { 1 + 2 * 3 }", "main"),
      Node::ret(Node::binary(Add, IntLit(1), Node::binary(Mul, IntLit(2), IntLit(3))))
    );
    assert_eq!(
      body_of("main { (1 + 2) % 3 }", "main"),
      Node::ret(Node::binary(Mod, Node::binary(Add, IntLit(1), IntLit(2)), IntLit(3)))
    );
  }

  #[test]
  fn statement_sequence_with_trailing_return() {
    assert_eq!(
      body_of("main { x = 5; x + 1 }", "main"),
      Node::seq(
        Node::assign("x", IntLit(5)),
        Node::ret(Node::binary(Add, Node::var("x"), IntLit(1)))
      )
    );
  }

  #[test]
  fn lone_statement_is_not_cut_short_by_trailing_expression() {
    assert_eq!(body_of("main { x = 1 }", "main"), Node::assign("x", IntLit(1)));
    assert_eq!(
      body_of("main { write(1) }", "main"),
      Node::ret(call("write", vec![IntLit(1)]))
    );
  }

  #[test]
  fn block_condition_and_ternary() {
    assert_eq!(
      body_of("main { if (1 == 1) { x = 1 } { x = 2 } }", "main"),
      Node::cond(
        Node::binary(Eq, IntLit(1), IntLit(1)),
        Node::block(Node::assign("x", IntLit(1))),
        Node::block(Node::assign("x", IntLit(2))),
      )
    );
    assert_eq!(
      body_of("main a b { if (~a < b) {1} {2} }", "main"),
      Node::ret(Node::ternary(
        Node::not(Node::binary(Less, Node::var("a"), Node::var("b"))),
        IntLit(1),
        IntLit(2),
      ))
    );
  }

  #[test]
  fn boolean_operators_chain_to_the_right() {
    assert_eq!(
      body_of("main a { if (a > 1 + 1 && a != 7) {a} {0} }", "main"),
      Node::ret(Node::ternary(
        Node::binary(
          Greater,
          Node::var("a"),
          Node::binary(
            And,
            Node::binary(Add, IntLit(1), IntLit(1)),
            Node::binary(NotEq, Node::var("a"), IntLit(7)),
          ),
        ),
        Node::var("a"),
        IntLit(0),
      ))
    );
  }

  #[test]
  fn call_arity_must_match_declaration() {
    assert!(parse("f a b { a + b } main { f(1, 2) }").is_ok());
    assert_eq!(
      parse("f a b { a + b } main { f(1) }").unwrap_err(),
      CompileError::ParseExhaustion
    );
    assert_eq!(
      parse("f a b { a + b } main { f(1, 2, 3) }").unwrap_err(),
      CompileError::ParseExhaustion
    );
    assert!(parse("main { read(1) }").is_err());
    assert!(parse("main { write() }").is_err());
  }

  #[test]
  fn calls_resolve_only_against_earlier_or_own_declarations() {
    assert!(parse("f n { if (n == 0) {1} {f(n - 1)} } main { f(3) }").is_ok());
    assert!(parse("main { f() } f { 1 }").is_err());
  }

  #[test]
  fn call_sites_share_the_declaration_ident() {
    let fns = parse("f { 1 } main { f() }").unwrap();
    let decl = &fns.decls()[0];
    let Node::Block(body) = &fns.decls()[1].body else {
      panic!("expected block");
    };
    let Node::Return(expr) = body.as_ref() else {
      panic!("expected return");
    };
    let Node::Call { callee, args } = expr.as_ref() else {
      panic!("expected call");
    };
    assert!(args.is_empty());
    assert!(Rc::ptr_eq(callee, &decl.ident));
  }

  #[test]
  fn parameter_scan_skips_junk_and_repeats() {
    let fns = parse("f a , b ; a { a } main { f(1, 2) }").unwrap();
    assert_eq!(fns.decls()[0].params, ["a", "b"]);
    assert_eq!(fns.lookup("f").map(|sig| sig.arity), Some(2));
  }

  #[test]
  fn parameters_come_back_sorted() {
    let fns = parse("f c b a c { a } main { f(1, 2, 3) }").unwrap();
    assert_eq!(fns.decls()[0].params, ["a", "b", "c"]);
  }

  #[test]
  fn deeply_nested_blocks_parse_in_linear_time() {
    let depth = 40;
    let src = format!("main {{ {}1{} }}", "{ ".repeat(depth), " }".repeat(depth));
    let mut body = body_of(&src, "main");
    for _ in 0..depth {
      let Node::Return(expr) = body else {
        panic!("expected return");
      };
      let Node::Block(inner) = *expr else {
        panic!("expected block");
      };
      body = *inner;
    }
    assert_eq!(body, Node::ret(IntLit(1)));
  }

  #[test]
  fn deeply_nested_conditionals_parse_in_linear_time() {
    let depth = 32;
    let src = format!(
      "main a {{ {}a{} }}",
      "if (a > 0) { ".repeat(depth),
      " } { 0 }".repeat(depth)
    );
    assert!(parse(&src).is_ok());
  }

  #[test]
  fn declarations_keep_source_order() {
    let fns = parse("g { 2 } main { g() } h { 3 }").unwrap();
    let labels: Vec<_> = fns.decls().iter().map(FnDecl::label).collect();
    assert_eq!(labels, ["g", "main", "h"]);
  }

  #[test]
  fn malformed_declarations_exhaust_the_parser() {
    assert_eq!(parse("main { 1 } main { 2 }").unwrap_err(), CompileError::ParseExhaustion);
    assert_eq!(parse("read { 1 }").unwrap_err(), CompileError::ParseExhaustion);
    assert_eq!(parse("main { 1; }").unwrap_err(), CompileError::ParseExhaustion);
    assert_eq!(parse("main { 1 ").unwrap_err(), CompileError::ParseExhaustion);
    assert_eq!(parse("1 main { 1 }").unwrap_err(), CompileError::ParseExhaustion);
  }
}
