use crate::error::Error;

// ----------------------------------------------------------------------------
// Statement

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Source,
    /// Definition of a literal, generated when a pool is flushed.
    Literal,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub line: usize,
    pub raw: String,
    pub label: Option<String>,
    pub op: String,
    pub extended: bool,
    pub operands: Vec<String>,
    pub comment: bool,
    pub origin: Origin,
    addr: Option<u32>,
}

impl Statement {
    /// `[label] op [operand[,operand]] [comment]`
    ///
    /// A line starting with a blank has no label. A line whose first
    /// non-blank character is `.` (or an empty line) is a comment.
    pub fn parse(line: usize, raw: &str) -> Statement {
        let mut stmt = Statement {
            line,
            raw: raw.to_string(),
            label: None,
            op: String::new(),
            extended: false,
            operands: vec![],
            comment: false,
            origin: Origin::Source,
            addr: None,
        };

        let code = raw.trim();
        if code.is_empty() || code.starts_with('.') {
            stmt.comment = true;
            return stmt;
        }

        let words = fields(raw);
        let mut words = words.into_iter();

        if !raw.starts_with(char::is_whitespace) {
            stmt.label = words.next().map(str::to_string);
        }

        if let Some(op) = words.next() {
            match op.strip_prefix('+') {
                Some(op) => {
                    stmt.extended = true;
                    stmt.op = op.to_string();
                }
                None => stmt.op = op.to_string(),
            }
        }

        if let Some(operand) = words.next().filter(|w| !w.starts_with('.')) {
            stmt.operands = split_operands(operand);
        }

        stmt
    }

    /// Synthetic `BYTE` statement that defines a flushed literal.
    pub fn literal(line: usize, text: &str, addr: u32) -> Statement {
        let value = text.trim_start_matches('=');
        Statement {
            line,
            raw: format!("*\t{}", text),
            label: None,
            op: "BYTE".to_string(),
            extended: false,
            operands: vec![value.to_string()],
            comment: false,
            origin: Origin::Literal,
            addr: Some(addr),
        }
    }

    pub fn addr(&self) -> Option<u32> {
        self.addr
    }

    pub fn set_addr(&mut self, addr: u32) {
        self.addr.get_or_insert(addr);
    }

    pub fn operand(&self, idx: usize) -> Option<&str> {
        self.operands.get(idx).map(String::as_str)
    }
}

/// Split on blanks, keeping quoted text (`C'A B'`) in one field.
fn fields(s: &str) -> Vec<&str> {
    let mut words = vec![];
    let mut start = None;
    let mut quoted = false;
    for (idx, ch) in s.char_indices() {
        if ch == '\'' {
            quoted = !quoted;
        }
        match (start, ch.is_whitespace() && !quoted) {
            (None, false) => start = Some(idx),
            (Some(begin), true) => {
                words.push(&s[begin..idx]);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        words.push(&s[begin..]);
    }
    words
}

/// `BUFFER,X` -> [`BUFFER`, `X`]. A comma inside quotes does not split.
fn split_operands(s: &str) -> Vec<String> {
    let mut quoted = false;
    for (idx, ch) in s.char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            ',' if !quoted => {
                return vec![s[..idx].to_string(), s[idx + 1..].to_string()];
            }
            _ => {}
        }
    }
    vec![s.to_string()]
}

// ----------------------------------------------------------------------------
// Constant

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Char(String),
    Hex(String),
}

impl Constant {
    /// `C'EOF'` or `X'F1'`
    pub fn parse(s: &str) -> Result<Constant, Error> {
        let malformed = || Error::MalformedConstant(s.to_string());
        let mut chars = s.chars();
        let tag = chars.next().ok_or_else(malformed)?;
        let body = chars
            .as_str()
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
            .ok_or_else(malformed)?;
        match tag.to_ascii_uppercase() {
            'C' => Ok(Constant::Char(body.to_string())),
            'X' => {
                if body.len() % 2 != 0 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(malformed());
                }
                Ok(Constant::Hex(body.to_ascii_uppercase()))
            }
            _ => Err(malformed()),
        }
    }

    pub fn len(&self) -> u32 {
        match self {
            Constant::Char(s) => s.len() as u32,
            Constant::Hex(s) => s.len() as u32 / 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_bin(&self) -> Vec<u8> {
        match self {
            Constant::Char(s) => s.bytes().collect(),
            Constant::Hex(s) => (0..s.len())
                .step_by(2)
                .filter_map(|idx| u8::from_str_radix(&s[idx..idx + 2], 16).ok())
                .collect(),
        }
    }
}

// ----------------------------------------------------------------------------
// Number

pub fn parse_num(s: &str) -> Result<i32, Error> {
    parse_with_prefix(s).ok_or_else(|| Error::InvalidNumber(s.to_string()))
}

/// `WORD` operand: anything that fits 24 bits, signed or not.
pub fn parse_word(s: &str) -> Result<i32, Error> {
    match parse_num(s)? {
        v if (-0x800000..=0xFFFFFF).contains(&v) => Ok(v),
        _ => Err(Error::InvalidNumber(s.to_string())),
    }
}

fn parse_with_prefix(s: &str) -> Option<i32> {
    match s.strip_prefix('-') {
        Some(rest) => parse_with_prefix(rest)?.checked_neg(),
        None => match s.get(..2) {
            Some("0x") | Some("0X") => i32::from_str_radix(&s[2..], 16).ok(),
            Some("0b") => i32::from_str_radix(&s[2..], 2).ok(),
            _ => s.parse::<i32>().ok(),
        },
    }
}
