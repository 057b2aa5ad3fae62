use std::collections::BTreeMap;
use std::rc::Rc;

use crate::internal::*;

pub const ENTRY_LABEL: &str = "main";

/// Runtime support functions every program may call: `(label, arity)`.
pub const BUILTINS: [(&str, usize); 2] = [("read", 0), ("write", 1)];

#[derive(Debug, PartialEq, Eq)]
pub struct Signature {
  pub ident: Rc<Ident>,
  pub arity: usize,
}

/// All callable functions: the built-ins plus every declaration parsed so
/// far. Signatures are registered before a body is parsed so that the
/// body may call its own function.
#[derive(Debug)]
pub struct FnTable {
  sigs: BTreeMap<String, Signature>,
  decls: Vec<FnDecl>,
}

impl FnTable {
  pub fn new() -> Self {
    let mut table = FnTable {
      sigs: BTreeMap::new(),
      decls: Vec::with_capacity(8),
    };
    for (label, arity) in BUILTINS {
      table.declare(label, arity);
    }
    table
  }

  pub fn lookup(&self, label: &str) -> Option<&Signature> {
    self.sigs.get(label)
  }

  pub fn contains(&self, label: &str) -> bool {
    self.sigs.contains_key(label)
  }

  /// Registers `label` and hands back the identifier its call sites will
  /// share. `None` if the label is already taken.
  pub fn declare(&mut self, label: &str, arity: usize) -> Option<Rc<Ident>> {
    if self.contains(label) {
      return None;
    }
    let ident = Ident::new(label);
    let sig = Signature { ident: Rc::clone(&ident), arity };
    self.sigs.insert(label.to_string(), sig);
    Some(ident)
  }

  /// Drops a signature whose declaration failed to parse.
  pub fn retract(&mut self, label: &str) {
    self.sigs.remove(label);
  }

  pub fn define(&mut self, decl: FnDecl) {
    debug_assert!(self.contains(decl.label()));
    self.decls.push(decl);
  }

  pub fn labels(&self) -> impl Iterator<Item = &str> {
    self.sigs.keys().map(String::as_str)
  }

  /// Declarations in source order, built-ins excluded.
  pub fn decls(&self) -> &[FnDecl] {
    &self.decls
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtins_are_always_present() {
    let table = FnTable::new();
    assert_eq!(table.lookup("read").map(|s| s.arity), Some(0));
    assert_eq!(table.lookup("write").map(|s| s.arity), Some(1));
    assert!(table.decls().is_empty());
  }

  #[test]
  fn labels_cannot_be_declared_twice() {
    let mut table = FnTable::new();
    assert!(table.declare("f", 2).is_some());
    assert!(table.declare("f", 1).is_none());
    assert!(table.declare("write", 1).is_none());
    table.retract("f");
    assert!(table.declare("f", 1).is_some());
  }

  #[test]
  fn call_sites_share_the_declared_ident() {
    let mut table = FnTable::new();
    let ident = table.declare("f", 0).unwrap();
    let sig = table.lookup("f").unwrap();
    assert!(Rc::ptr_eq(&ident, &sig.ident));
  }
}
