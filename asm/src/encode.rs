use arch::{
    inst::{Flag, Inst, ADDR_MAX, DISP_MAX},
    op::Operation,
    reg::Reg,
};

use crate::{
    error::Error,
    parser::{parse_num, parse_word, Constant, Statement},
    symbol::{Name, SymbolTable},
};

// ----------------------------------------------------------------------------
// Operand

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Num(i32),
    Sym(Name),
}

impl Target {
    fn parse(s: &str, pool: usize) -> Target {
        if s.starts_with('=') {
            return Target::Sym(Name::Literal(pool, s.to_string()));
        }
        match parse_num(s) {
            Ok(v) => Target::Num(v),
            Err(_) => Target::Sym(Name::Label(s.to_string())),
        }
    }
}

/// Value of the base register as set by `BASE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base {
    Addr(u32),
    /// Not yet defined when `BASE` was seen.
    Sym(Name),
}

impl Base {
    pub fn parse(s: &str, symbols: &SymbolTable) -> Base {
        match Target::parse(s, 0) {
            Target::Num(v) => Base::Addr(v as u32),
            Target::Sym(name) => match symbols.address(&name) {
                Some(addr) => Base::Addr(addr),
                None => Base::Sym(name),
            },
        }
    }
}

// ----------------------------------------------------------------------------
// Format 3/4

#[derive(Debug, Clone)]
pub enum Step {
    Done(Inst),
    /// Needs the address of this symbol first.
    Wait(Name),
}

/// A format 3/4 instruction with everything but the address field decided.
#[derive(Debug, Clone)]
pub struct Draft {
    pub site: u32,
    pub line: usize,
    pub opcode: u8,
    /// n, i and x. b, p and e are chosen on completion.
    pub flags: u8,
    pub extended: bool,
    pub target: Option<Target>,
    pub base: Option<Base>,
}

impl Draft {
    pub fn new(
        stmt: &Statement,
        op: &Operation,
        site: u32,
        pool: usize,
        base: Option<Base>,
    ) -> Draft {
        let (flags, target) = match stmt.operand(0) {
            None => (Flag::N | Flag::I, None),
            Some(operand) => {
                let (flags, rest) = if let Some(rest) = operand.strip_prefix('#') {
                    (Flag::I, rest)
                } else if let Some(rest) = operand.strip_prefix('@') {
                    (Flag::N, rest)
                } else if stmt.operand(1).is_some() {
                    (Flag::N | Flag::I | Flag::X, operand)
                } else {
                    (Flag::N | Flag::I, operand)
                };
                (flags, Some(Target::parse(rest, pool)))
            }
        };
        Draft {
            site,
            line: stmt.line,
            opcode: op.opcode,
            flags,
            extended: stmt.extended,
            target,
            base,
        }
    }

    /// Needs a modification record: extended and address-valued.
    pub fn relocatable(&self) -> bool {
        self.extended && matches!(self.target, Some(Target::Sym(_)))
    }

    /// Same bits with a zero address field.
    pub fn placeholder(&self) -> Inst {
        if self.extended {
            Inst::F4(self.opcode, self.flags | Flag::E, 0)
        } else {
            Inst::F3(self.opcode, self.flags, 0)
        }
    }

    pub fn complete(&self, symbols: &SymbolTable) -> Result<Step, Error> {
        let (op, flags) = (self.opcode, self.flags);
        let target = match &self.target {
            None => return Ok(Step::Done(self.placeholder())),
            Some(Target::Num(v)) => {
                let v = *v;
                // negative values go in as two's complement of the field width
                return match self.extended {
                    true if (-0x80000..=ADDR_MAX as i32).contains(&v) => {
                        let addr = v as u32 & ADDR_MAX;
                        Ok(Step::Done(Inst::F4(op, flags | Flag::E, addr)))
                    }
                    false if (-0x800..=DISP_MAX as i32).contains(&v) => {
                        let disp = (v as u32 & DISP_MAX) as u16;
                        Ok(Step::Done(Inst::F3(op, flags, disp)))
                    }
                    _ => Err(self.out_of_range(v.to_string())),
                };
            }
            Some(Target::Sym(name)) => match symbols.address(name) {
                Some(addr) => addr,
                None => return Ok(Step::Wait(name.clone())),
            },
        };

        if self.extended {
            if target > ADDR_MAX {
                return Err(self.out_of_range(format!("{:06X}", target)));
            }
            return Ok(Step::Done(Inst::F4(op, flags | Flag::E, target)));
        }

        let disp = target as i64 - (self.site as i64 + 3);
        if (-2048..=2047).contains(&disp) {
            let disp = (disp as u32 & DISP_MAX) as u16;
            return Ok(Step::Done(Inst::F3(op, flags | Flag::P, disp)));
        }

        let base = match &self.base {
            Some(Base::Addr(addr)) => *addr,
            Some(Base::Sym(name)) => match symbols.address(name) {
                Some(addr) => addr,
                None => return Ok(Step::Wait(name.clone())),
            },
            None => return Err(self.out_of_range(format!("{:06X}", target))),
        };
        let disp = target as i64 - base as i64;
        if (0..=DISP_MAX as i64).contains(&disp) {
            Ok(Step::Done(Inst::F3(op, flags | Flag::B, disp as u16)))
        } else {
            Err(self.out_of_range(format!("{:06X}", target)))
        }
    }

    fn out_of_range(&self, target: String) -> Error {
        let mode = match (self.extended, &self.base) {
            (true, _) => "format 4",
            (false, None) => "format 3 without BASE",
            (false, Some(_)) => "format 3",
        };
        Error::DisplacementOutOfRange(target, mode.to_string())
    }
}

// ----------------------------------------------------------------------------
// Format 1/2 and data

pub fn format1(op: &Operation) -> Inst {
    Inst::F1(op.opcode)
}

/// Register operands, or a small number (`SVC n`, `SHIFTL r,n`).
pub fn format2(stmt: &Statement, op: &Operation) -> Result<Inst, Error> {
    let nibble = |s: &str| -> Result<u8, Error> {
        if let Ok(reg) = Reg::parse(s) {
            return Ok(reg.num());
        }
        match parse_num(s) {
            Ok(n) if (0..=15).contains(&n) => Ok(n as u8),
            _ => Err(Error::InvalidRegister(s.to_string())),
        }
    };
    let r1 = stmt
        .operand(0)
        .ok_or_else(|| Error::MissingOperand(stmt.op.clone()))?;
    let r1 = nibble(r1)?;
    let r2 = match stmt.operand(1) {
        Some(r2) => nibble(r2)?,
        None => 0,
    };
    Ok(Inst::F2(op.opcode, r1, r2))
}

/// 24-bit two's complement. Bad operands were reported during placement.
pub fn word(stmt: &Statement) -> Vec<u8> {
    let value = stmt.operand(0).and_then(|s| parse_word(s).ok()).unwrap_or(0);
    (value as u32).to_be_bytes()[1..].to_vec()
}

/// Bytes of a `BYTE` constant. Bad constants were reported during placement.
pub fn byte(stmt: &Statement) -> Vec<u8> {
    stmt.operand(0)
        .and_then(|s| Constant::parse(s).ok())
        .map(|c| c.to_bin())
        .unwrap_or_default()
}
