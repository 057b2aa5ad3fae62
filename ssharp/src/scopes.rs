use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
  /// A function name. Never assignable.
  Reserved,
  Param,
  Local,
}

impl Binding {
  pub const fn is_assignable(self) -> bool {
    matches!(self, Binding::Local)
  }
}

/// Names visible inside one function activation. Entries are only ever
/// added or retagged, never removed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Scope {
  symbols: BTreeMap<String, Binding>,
}

impl Scope {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_reserved<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
    let mut scope = Scope::new();
    for name in names {
      scope.bind(name, Binding::Reserved);
    }
    scope
  }

  pub fn bind(&mut self, name: &str, binding: Binding) {
    self.symbols.insert(name.to_string(), binding);
  }

  pub fn lookup(&self, name: &str) -> Option<Binding> {
    self.symbols.get(name).copied()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.symbols.contains_key(name)
  }
}
