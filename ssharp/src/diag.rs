use thiserror::Error;

/// Every way a run can fail. None of them carries a source location.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
  #[error("unrecognized lexeme")]
  Lex,
  #[error("no `main` function declared")]
  MissingEntryPoint,
  #[error("tokens left that do not form a function declaration")]
  ParseExhaustion,
  #[error("use of undeclared name `{0}`")]
  UndeclaredName(String),
  #[error("cannot assign to `{0}`")]
  IllegalReassignment(String),
}

pub type CompileResult<T> = Result<T, CompileError>;
