use indexmap::IndexMap;
use std::fmt;

use crate::{encode::Draft, error::Error};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Name {
    Label(String),
    /// Literal text, qualified by the pool that holds it.
    Literal(usize, String),
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Label(name) => write!(f, "{}", name),
            Name::Literal(_, text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone)]
pub enum State {
    Resolved(u32),
    /// Referenced before definition; instructions waiting for the address.
    Pending(Vec<Draft>),
}

#[derive(Debug, Clone)]
pub struct Symbol {
    /// Defining line, or the first referencing line while pending.
    pub line: usize,
    pub state: State,
}

#[derive(Debug, Default)]
pub struct SymbolTable(IndexMap<Name, Symbol>);

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable(IndexMap::new())
    }

    /// Resolve `name` to `addr` and hand back the fixups that were waiting on it.
    /// A name that is already resolved keeps its first address.
    pub fn define(&mut self, name: Name, addr: u32, line: usize) -> Result<Vec<Draft>, Error> {
        match self.0.get_mut(&name) {
            Some(Symbol {
                state: State::Resolved(_),
                ..
            }) => Err(Error::DuplicateSymbol(name.to_string())),
            Some(symbol) => {
                let prev = std::mem::replace(&mut symbol.state, State::Resolved(addr));
                symbol.line = line;
                match prev {
                    State::Pending(fixups) => Ok(fixups),
                    State::Resolved(_) => Ok(vec![]),
                }
            }
            None => {
                let state = State::Resolved(addr);
                self.0.insert(name, Symbol { line, state });
                Ok(vec![])
            }
        }
    }

    /// Queue `draft` until `name` is defined.
    /// Gives the draft back when `name` is already resolved.
    pub fn refer(&mut self, name: Name, draft: Draft) -> Option<Draft> {
        let line = draft.line;
        let symbol = self.0.entry(name).or_insert_with(|| Symbol {
            line,
            state: State::Pending(vec![]),
        });
        match &mut symbol.state {
            State::Pending(fixups) => {
                fixups.push(draft);
                None
            }
            State::Resolved(_) => Some(draft),
        }
    }

    pub fn address(&self, name: &Name) -> Option<u32> {
        match self.0.get(name) {
            Some(Symbol {
                state: State::Resolved(addr),
                ..
            }) => Some(*addr),
            _ => None,
        }
    }

    pub fn line(&self, name: &Name) -> Option<usize> {
        self.0.get(name).map(|symbol| symbol.line)
    }

    pub fn pending(&self) -> impl Iterator<Item = (&Name, &Symbol)> {
        self.0
            .iter()
            .filter(|(_, symbol)| matches!(symbol.state, State::Pending(_)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Symbol)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
