use arch::{
    inst::ADDR_MAX,
    op::{OpTable, Operation},
};
use strum::EnumString;

use crate::{
    error::Error,
    literal::{Literal, LiteralPool},
    parser::{parse_num, parse_word, Constant, Statement},
};

/// Bytes of SIC/XE memory. The counter may reach but not pass it.
pub const MEMORY: u32 = ADDR_MAX + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, strum::Display)]
pub enum Directive {
    START,
    END,
    BYTE,
    WORD,
    RESB,
    RESW,
    BASE,
    NOBASE,
    LTORG,
}

#[derive(Debug, Clone, Copy)]
pub enum Kind<'a> {
    Comment,
    Directive(Directive),
    Inst(&'a Operation),
    Invalid,
}

impl<'a> Kind<'a> {
    pub fn of(stmt: &Statement, optab: &'a OpTable) -> Kind<'a> {
        if stmt.comment {
            return Kind::Comment;
        }
        if let Some(op) = optab.get(&stmt.op) {
            return Kind::Inst(op);
        }
        match stmt.op.to_ascii_uppercase().parse::<Directive>() {
            Ok(directive) => Kind::Directive(directive),
            Err(_) => Kind::Invalid,
        }
    }
}

#[derive(Debug, Default)]
pub struct Placed {
    /// Literals flushed by this statement, with addresses.
    pub literals: Vec<Literal>,
    /// Problems that do not stop the walk.
    pub errors: Vec<Error>,
}

// ----------------------------------------------------------------------------
// Location counter

#[derive(Debug)]
pub struct Locator {
    locctr: u32,
    start: u32,
    name: String,
    started: bool,
    ended: bool,
    first: Option<u32>,
    transfer: Option<String>,
    pool: LiteralPool,
}

impl Locator {
    pub fn new() -> Self {
        Locator {
            locctr: 0,
            start: 0,
            name: String::new(),
            started: false,
            ended: false,
            first: None,
            transfer: None,
            pool: LiteralPool::new(0),
        }
    }

    /// Assign `stmt` its address and advance the location counter.
    /// Only a missing `START` is fatal.
    pub fn place(&mut self, stmt: &mut Statement, kind: Kind) -> Result<Placed, Error> {
        let mut placed = Placed::default();

        if let Kind::Comment = kind {
            return Ok(placed);
        }

        if !self.started {
            let Kind::Directive(Directive::START) = kind else {
                return Err(Error::MissingStart);
            };
            let start = match stmt.operand(0).map(|o| (o, parse_num(o))) {
                None => 0,
                Some((_, Ok(v))) if (0..=ADDR_MAX as i32).contains(&v) => v as u32,
                Some((o, Ok(v))) if v > 0 => {
                    placed.errors.push(Error::AddressOverflow(o.to_string()));
                    0
                }
                Some((o, _)) => {
                    placed.errors.push(Error::InvalidNumber(o.to_string()));
                    0
                }
            };
            self.start = start;
            self.locctr = start;
            self.name = stmt.label.clone().unwrap_or_default();
            self.started = true;
            stmt.set_addr(start);
            return Ok(placed);
        }

        if let Some(text) = stmt.operand(0).filter(|o| o.starts_with('=')) {
            if let Err(err) = self.pool.insert(text) {
                placed.errors.push(err);
            }
        }

        match kind {
            Kind::Directive(Directive::END) => {
                placed.literals = self.flush(&mut placed.errors);
                stmt.set_addr(self.locctr);
                self.transfer = stmt.operand(0).map(str::to_string);
                self.ended = true;
            }
            Kind::Directive(Directive::LTORG) => {
                stmt.set_addr(self.locctr);
                placed.literals = self.flush(&mut placed.errors);
            }
            _ => {
                stmt.set_addr(self.locctr);
                match size(stmt, kind).and_then(|size| self.advance(size)) {
                    Ok(()) => {
                        if let (Kind::Inst(_), None) = (kind, self.first) {
                            self.first = stmt.addr();
                        }
                    }
                    Err(err) => placed.errors.push(err),
                }
                if let Kind::Directive(Directive::WORD) = kind {
                    let checked = match stmt.operand(0) {
                        Some(operand) => parse_word(operand).map(|_| ()),
                        None => Err(Error::MissingOperand(stmt.op.clone())),
                    };
                    if let Err(err) = checked {
                        placed.errors.push(err);
                    }
                }
            }
        }

        Ok(placed)
    }

    /// Move the counter past `size` bytes, unless that leaves memory.
    fn advance(&mut self, size: u32) -> Result<(), Error> {
        let end = self.locctr as u64 + size as u64;
        if end > MEMORY as u64 {
            return Err(Error::AddressOverflow(format!("{:X}", end)));
        }
        self.locctr = end as u32;
        Ok(())
    }

    /// Place the current pool. A literal that does not fit takes no space.
    fn flush(&mut self, errors: &mut Vec<Error>) -> Vec<Literal> {
        let next = LiteralPool::new(self.pool.id() + 1);
        let mut literals = std::mem::replace(&mut self.pool, next).into_literals();
        for literal in &mut literals {
            literal.addr = Some(self.locctr);
            if let Err(err) = self.advance(literal.value.len()) {
                literal.value = Constant::Hex(String::new());
                errors.push(err);
            }
        }
        literals
    }

    pub fn locctr(&self) -> u32 {
        self.locctr
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn length(&self) -> u32 {
        self.locctr - self.start
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Address of the first instruction.
    pub fn first(&self) -> Option<u32> {
        self.first
    }

    /// Operand of `END`.
    pub fn transfer(&self) -> Option<&str> {
        self.transfer.as_deref()
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::new()
    }
}

fn size(stmt: &Statement, kind: Kind) -> Result<u32, Error> {
    let operand = || {
        stmt.operand(0)
            .ok_or_else(|| Error::MissingOperand(stmt.op.clone()))
    };
    let count = |s: &str| -> Result<u32, Error> {
        match parse_num(s)? {
            n if n >= 0 => Ok(n as u32),
            _ => Err(Error::InvalidNumber(s.to_string())),
        }
    };
    match kind {
        Kind::Inst(op) => Ok(op.format.size(stmt.extended)),
        Kind::Directive(directive) => match directive {
            Directive::WORD => Ok(3),
            Directive::RESW => Ok(count(operand()?)?.saturating_mul(3)),
            Directive::RESB => count(operand()?),
            Directive::BYTE => Ok(Constant::parse(operand()?)?.len()),
            Directive::START => Err(Error::MisplacedStart),
            Directive::BASE | Directive::NOBASE | Directive::END | Directive::LTORG => Ok(0),
        },
        Kind::Comment => Ok(0),
        Kind::Invalid => Err(Error::InvalidOperation(stmt.op.clone())),
    }
}
