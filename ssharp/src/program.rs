use crate::internal::{TokenKind as T, *};

pub const PREAMBLE: &str = "#include <iostream>\n\
#include <cstdint>\n\
#include <stdint.h>\n\
uint64_t read() {uint64_t x; scanf_s(\"%lu\", &x); return x;}\n";

/// Emitted only when the source mentions `write`.
pub const WRITE_SUPPORT: &str =
  "int64_t write(uint64_t x) {printf_s(\"%lu\\n\", x); return 0;}\n";

/// A parsed program whose entry point is known to exist.
#[derive(Debug)]
pub struct Program {
  fns: FnTable,
  uses_write: bool,
}

impl Program {
  #[instrument(skip_all)]
  pub fn parse(src: &str) -> CompileResult<Program> {
    let tokens = tokenize(src);
    if tokens.first().is_some_and(|token| token.is(T::Malformed)) {
      return Err(CompileError::Lex);
    }
    let fns = Parser::new(&tokens).parse()?;
    if !fns.decls().iter().any(FnDecl::is_entry) {
      return Err(CompileError::MissingEntryPoint);
    }
    let uses_write = tokens.iter().any(|token| token.name() == Some("write"));
    debug!(functions = fns.decls().len(), uses_write, "parsed program");
    Ok(Program { fns, uses_write })
  }

  pub const fn fns(&self) -> &FnTable {
    &self.fns
  }

  /// Emits the preamble, then every declaration in source order, each in a
  /// fresh scope where all function labels are reserved.
  #[instrument(skip_all)]
  pub fn emit(&self, emitter: &mut Emitter) -> CompileResult<()> {
    emitter.push(PREAMBLE);
    if self.uses_write {
      emitter.push(WRITE_SUPPORT);
    }
    for decl in self.fns.decls() {
      let mut scope = Scope::with_reserved(self.fns.labels());
      emitter.emit_fn_decl(decl, &mut scope)?;
    }
    Ok(())
  }
}

/// Runs the whole pipeline over one program.
pub fn transpile(src: &str) -> CompileResult<String> {
  let program = Program::parse(src)?;
  let mut emitter = Emitter::new();
  program.emit(&mut emitter)?;
  Ok(emitter.into_output())
}
