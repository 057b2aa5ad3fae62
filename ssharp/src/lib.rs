pub mod ast;
pub mod diag;
pub mod emit;
pub mod fn_table;
pub mod lexer;
pub mod parser;
pub mod program;
pub mod scopes;
pub mod token;

pub use diag::CompileError;
pub use program::{Program, transpile};

pub mod internal {
  pub use crate::ast::*;
  pub use crate::diag::*;
  pub use crate::emit::*;
  pub use crate::fn_table::*;
  pub use crate::lexer::*;
  pub use crate::parser::*;
  pub use crate::program::*;
  pub use crate::scopes::*;
  pub use crate::token::*;
  pub use tracing::{debug, instrument, trace};
}
