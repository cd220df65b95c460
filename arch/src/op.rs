use once_cell::sync::Lazy;
use std::collections::HashMap;
use strum::EnumString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum Format {
    #[strum(serialize = "1")]
    One,
    #[strum(serialize = "2")]
    Two,
    #[strum(serialize = "3/4")]
    ThreeFour,
}

impl Format {
    /// Instruction length in bytes. Only format 3/4 depends on `extended`.
    pub fn size(&self, extended: bool) -> u32 {
        match self {
            Format::One => 1,
            Format::Two => 2,
            Format::ThreeFour if extended => 4,
            Format::ThreeFour => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub mnemonic: String,
    pub format: Format,
    pub opcode: u8,
}

impl Operation {
    /// `LDA 3/4 00`
    pub fn parse(s: &str) -> Result<Self, String> {
        let words: Vec<&str> = s.split_whitespace().collect();
        match words.as_slice() {
            [mnemonic, format, opcode] => {
                let format = format
                    .parse::<Format>()
                    .map_err(|_| format!("Unknown format: {format}"))?;
                let opcode = u8::from_str_radix(opcode, 16)
                    .map_err(|_| format!("Invalid opcode: {opcode}"))?;
                Ok(Operation {
                    mnemonic: mnemonic.to_ascii_uppercase(),
                    format,
                    opcode,
                })
            }
            _ => Err(format!("Expected `MNEMONIC FORMAT OPCODE`: {s}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpTable(HashMap<String, Operation>);

impl OpTable {
    pub fn new() -> Self {
        OpTable(HashMap::new())
    }

    /// One operation per line. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut table = OpTable::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let op = Operation::parse(line).map_err(|e| format!("line {}: {}", idx + 1, e))?;
            table.insert(op);
        }
        Ok(table)
    }

    pub fn insert(&mut self, op: Operation) -> Option<Operation> {
        self.0.insert(op.mnemonic.clone(), op)
    }

    pub fn get(&self, mnemonic: &str) -> Option<&Operation> {
        self.0.get(&mnemonic.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The standard SIC/XE instruction set.
pub static SICXE: Lazy<OpTable> = Lazy::new(|| {
    OpTable::parse(include_str!("optab.txt")).unwrap_or_default()
});
