use crate::internal::*;

/// Collects target-language text. Output appended before a failure is kept.
#[derive(Debug, Default)]
pub struct Emitter {
  out: String,
}

impl Emitter {
  pub fn new() -> Self {
    Emitter {
      out: String::with_capacity(1024),
    }
  }

  pub fn output(&self) -> &str {
    &self.out
  }

  pub fn into_output(self) -> String {
    self.out
  }

  pub fn push(&mut self, text: &str) {
    self.out.push_str(text);
  }

  #[instrument(skip_all, fields(label = decl.label()))]
  pub fn emit_fn_decl(&mut self, decl: &FnDecl, scope: &mut Scope) -> CompileResult<()> {
    self.push(if decl.is_entry() { "int " } else { "uint64_t " });
    self.push(decl.label());
    self.push("(");
    for (i, param) in decl.params.iter().enumerate() {
      if i > 0 {
        self.push(",");
      }
      self.push("uint64_t ");
      self.push(param);
      scope.bind(param, Binding::Param);
    }
    self.push(")");
    self.emit(&decl.body, scope)
  }

  pub fn emit(&mut self, node: &Node, scope: &mut Scope) -> CompileResult<()> {
    match node {
      Node::IntLit(value) => self.push(&value.to_string()),
      Node::Binary { op, lhs, rhs } => {
        self.emit(lhs, scope)?;
        self.push(op.symbol());
        self.emit(rhs, scope)?;
      }
      Node::Not(operand) => {
        self.push("!");
        self.emit(operand, scope)?;
      }
      Node::Var(name) => self.emit_name(name, scope)?,
      Node::Assign { name, value } => {
        let binding = match scope.lookup(name) {
          Some(binding) => binding,
          None => {
            self.push("uint64_t ");
            scope.bind(name, Binding::Local);
            Binding::Local
          }
        };
        if !binding.is_assignable() {
          debug!(%name, ?binding, "assignment to non-local");
          return Err(CompileError::IllegalReassignment(name.clone()));
        }
        self.push(name);
        self.push("=");
        self.emit(value, scope)?;
      }
      Node::Seq { stmt, rest } => {
        self.emit(stmt, scope)?;
        self.push(";\n");
        self.emit(rest, scope)?;
      }
      Node::Return(expr) => {
        self.push("return ");
        self.emit(expr, scope)?;
        self.push(";");
      }
      Node::Call { callee, args } => {
        self.emit_name(&callee.name, scope)?;
        self.push("(");
        for (i, arg) in args.iter().enumerate() {
          if i > 0 {
            self.push(",");
          }
          self.emit(arg, scope)?;
        }
        self.push(")");
      }
      // the second block follows the first unguarded, there is no `else`
      Node::Cond { cond, then, otherwise } => {
        self.push("if(");
        self.emit(cond, scope)?;
        self.push(")");
        self.emit(then, scope)?;
        self.emit(otherwise, scope)?;
      }
      Node::Ternary { cond, then, otherwise } => {
        self.push("(");
        self.emit(cond, scope)?;
        self.push("?");
        self.emit(then, scope)?;
        self.push(":");
        self.emit(otherwise, scope)?;
        self.push(")");
      }
      Node::Block(body) => {
        self.push("{");
        self.emit(body, scope)?;
        self.push("}\n");
      }
    }
    Ok(())
  }

  fn emit_name(&mut self, name: &str, scope: &Scope) -> CompileResult<()> {
    if !scope.contains(name) {
      debug!(name, "undeclared name");
      return Err(CompileError::UndeclaredName(name.to_string()));
    }
    self.push(name);
    Ok(())
  }
}
