use std::{collections::BTreeMap, fmt};

/// Bytes of object code one text record may carry.
pub const TEXT_MAX: usize = 0x20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Header { name: String, start: u32, length: u32 },
    /// One group per statement.
    Text { start: u32, code: Vec<Vec<u8>> },
    Modification { location: u32, half_bytes: u8 },
    End { first: u32 },
}

impl Record {
    /// Object code carried by a text record.
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            Record::Text { code, .. } => code.concat(),
            _ => vec![],
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Header {
                name,
                start,
                length,
            } => write!(f, "H{:<6.6}{:06X}{:06X}", name, start, length),
            Record::Text { start, code } => {
                let len: usize = code.iter().map(Vec::len).sum();
                write!(f, "T {:06X} {:02X}", start, len)?;
                for group in code {
                    write!(f, " ")?;
                    for byte in group {
                        write!(f, "{:02X}", byte)?;
                    }
                }
                Ok(())
            }
            Record::Modification {
                location,
                half_bytes,
            } => write!(f, "M{:06X}{:02X}", location, half_bytes),
            Record::End { first } => write!(f, "E{:06X}", first),
        }
    }
}

// ----------------------------------------------------------------------------
// Object program

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectProgram(Vec<Record>);

impl ObjectProgram {
    pub fn records(&self) -> &[Record] {
        &self.0
    }

    pub fn header(&self) -> Option<&Record> {
        self.0.iter().find(|r| matches!(r, Record::Header { .. }))
    }

    pub fn texts(&self) -> impl Iterator<Item = &Record> {
        self.0.iter().filter(|r| matches!(r, Record::Text { .. }))
    }

    pub fn modifications(&self) -> impl Iterator<Item = &Record> {
        self.0
            .iter()
            .filter(|r| matches!(r, Record::Modification { .. }))
    }

    /// Memory image after loading every text record in order.
    /// A later record overwrites what an earlier one wrote.
    pub fn load(&self) -> BTreeMap<u32, u8> {
        let mut image = BTreeMap::new();
        for record in self.texts() {
            if let Record::Text { start, .. } = record {
                for (offset, byte) in record.bytes().into_iter().enumerate() {
                    image.insert(start.wrapping_add(offset as u32), byte);
                }
            }
        }
        image
    }
}

impl fmt::Display for ObjectProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.0 {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Emitter

#[derive(Debug)]
struct Open {
    start: u32,
    len: usize,
    code: Vec<Vec<u8>>,
}

/// Collects statement object code into text records.
#[derive(Debug, Default)]
pub struct Emitter {
    texts: Vec<Record>,
    open: Option<Open>,
    mods: Vec<Record>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object code of the statement at `addr`, in source order.
    ///
    /// A statement with no code (reservations, directives) ends the open
    /// record, as does a gap in addresses or a full record.
    pub fn push(&mut self, addr: u32, bytes: &[u8]) {
        if bytes.is_empty() {
            self.close();
            return;
        }
        for (idx, chunk) in bytes.chunks(TEXT_MAX).enumerate() {
            let addr = addr.wrapping_add((idx * TEXT_MAX) as u32);
            let fits = match &self.open {
                Some(open) => {
                    open.start.wrapping_add(open.len as u32) == addr
                        && open.len + chunk.len() <= TEXT_MAX
                }
                None => false,
            };
            if !fits {
                self.close();
            }
            let open = self.open.get_or_insert_with(|| Open {
                start: addr,
                len: 0,
                code: vec![],
            });
            open.len += chunk.len();
            open.code.push(chunk.to_vec());
        }
    }

    /// Corrected code for `addr`, written after everything emitted so far.
    pub fn patch(&mut self, addr: u32, bytes: &[u8]) {
        self.close();
        self.push(addr, bytes);
        self.close();
    }

    pub fn modify(&mut self, location: u32, half_bytes: u8) {
        self.mods.push(Record::Modification {
            location,
            half_bytes,
        });
    }

    fn close(&mut self) {
        if let Some(open) = self.open.take() {
            if open.len > 0 {
                self.texts.push(Record::Text {
                    start: open.start,
                    code: open.code,
                });
            }
        }
    }

    pub fn finish(mut self, name: &str, start: u32, length: u32, first: u32) -> ObjectProgram {
        self.close();
        let mut records = Vec::with_capacity(self.texts.len() + self.mods.len() + 2);
        records.push(Record::Header {
            name: name.to_string(),
            start,
            length,
        });
        records.extend(self.texts);
        records.extend(self.mods);
        records.push(Record::End { first });
        ObjectProgram(records)
    }
}
