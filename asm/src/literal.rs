use indexmap::IndexMap;

use crate::{error::Error, parser::Constant, symbol::Name};

#[derive(Debug, Clone)]
pub struct Literal {
    /// Source text including the leading `=`.
    pub text: String,
    pub value: Constant,
    pub pool: usize,
    pub addr: Option<u32>,
}

impl Literal {
    pub fn name(&self) -> Name {
        Name::Literal(self.pool, self.text.clone())
    }
}

/// Literals collected since the last flush, in order of first use.
#[derive(Debug)]
pub struct LiteralPool {
    id: usize,
    entries: IndexMap<String, Literal>,
}

impl LiteralPool {
    pub fn new(id: usize) -> Self {
        LiteralPool {
            id,
            entries: IndexMap::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Register `=C'..'` / `=X'..'`. Identical text shares one entry.
    ///
    /// A malformed literal is still registered, with no bytes, so references
    /// to it resolve; the error is returned for reporting.
    pub fn insert(&mut self, text: &str) -> Result<(), Error> {
        if self.entries.contains_key(text) {
            return Ok(());
        }
        let parsed = Constant::parse(text.trim_start_matches('='));
        let value = match &parsed {
            Ok(value) => value.clone(),
            Err(_) => Constant::Hex(String::new()),
        };
        self.entries.insert(
            text.to_string(),
            Literal {
                text: text.to_string(),
                value,
                pool: self.id,
                addr: None,
            },
        );
        parsed.map(|_| ())
    }

    /// Entries in order of first use, without addresses. Consumes the pool.
    pub fn into_literals(self) -> Vec<Literal> {
        self.entries.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
