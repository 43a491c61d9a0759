use std::rc::Rc;

#[derive(Debug)]
pub struct SymbolData {
    description: Option<String>,
}

/// Opaque field identifier. Two symbols are equal only if they are the same symbol.
#[derive(Clone, Debug)]
pub struct Symbol(Rc<SymbolData>);

impl Symbol {
    pub fn new(description: Option<&str>) -> Self {
        Symbol(Rc::new(SymbolData {
            description: description.map(str::to_string),
        }))
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Name(String),
    Symbol(Symbol),
}

impl FieldKey {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            FieldKey::Name(s) => Some(s),
            FieldKey::Symbol(_) => None,
        }
    }
}

impl From<&str> for FieldKey {
    fn from(s: &str) -> Self {
        FieldKey::Name(s.to_string())
    }
}

impl From<String> for FieldKey {
    fn from(s: String) -> Self {
        FieldKey::Name(s)
    }
}

impl From<&String> for FieldKey {
    fn from(s: &String) -> Self {
        FieldKey::Name(s.clone())
    }
}

impl From<Symbol> for FieldKey {
    fn from(sym: Symbol) -> Self {
        FieldKey::Symbol(sym)
    }
}

impl From<&Symbol> for FieldKey {
    fn from(sym: &Symbol) -> Self {
        FieldKey::Symbol(sym.clone())
    }
}

impl From<&FieldKey> for FieldKey {
    fn from(key: &FieldKey) -> Self {
        key.clone()
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKey::Name(s) => write!(f, "{}", s),
            FieldKey::Symbol(sym) => match sym.description() {
                Some(desc) => write!(f, "Symbol({})", desc),
                None => write!(f, "[symbol {:p}]", Rc::as_ptr(&sym.0)),
            },
        }
    }
}
