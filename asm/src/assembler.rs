use arch::{
    inst::Inst,
    op::{Format, OpTable},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    encode::{self, Base, Draft, Step},
    error::Error,
    literal::Literal,
    locate::{Directive, Kind, Locator, MEMORY},
    msg::{self, Diag, Failed},
    parser::{parse_num, Statement},
    record::{Emitter, ObjectProgram},
    symbol::{Name, SymbolTable},
};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Mode {
    /// Assign every address, then encode.
    #[default]
    TwoPass,
    /// Encode while assigning; forward references are patched later.
    OnePass,
}

/// A statement and the object code it ended up with.
#[derive(Debug, Clone)]
pub struct Listed {
    pub stmt: Statement,
    pub code: Vec<u8>,
}

#[derive(Debug)]
pub struct Assembly {
    pub program: ObjectProgram,
    pub listing: Vec<Listed>,
    pub symbols: SymbolTable,
    pub diags: Vec<Diag>,
}

impl Assembly {
    pub fn has_error(&self) -> bool {
        msg::has_error(&self.diags)
    }
}

pub fn assemble(source: &str, optab: &OpTable, mode: Mode) -> Result<Assembly, Failed> {
    let mut asm = Assembler::new(source, optab, mode);
    for (idx, raw) in source.lines().enumerate() {
        asm.line(idx + 1, raw)?;
    }
    asm.finish()
}

struct Assembler<'a> {
    optab: &'a OpTable,
    mode: Mode,
    source: Vec<&'a str>,
    locator: Locator,
    symbols: SymbolTable,
    emitter: Emitter,
    base: Option<Base>,
    pool: usize,
    /// Statements waiting for the second pass.
    queue: Vec<Statement>,
    listing: Vec<Listed>,
    /// Instruction address -> listing index.
    sites: HashMap<u32, usize>,
    diags: Vec<Diag>,
    end_line: usize,
    trailing: bool,
}

impl<'a> Assembler<'a> {
    fn new(source: &'a str, optab: &'a OpTable, mode: Mode) -> Self {
        Assembler {
            optab,
            mode,
            source: source.lines().collect(),
            locator: Locator::new(),
            symbols: SymbolTable::new(),
            emitter: Emitter::new(),
            base: None,
            pool: 0,
            queue: vec![],
            listing: vec![],
            sites: HashMap::new(),
            diags: vec![],
            end_line: 0,
            trailing: false,
        }
    }

    fn raw(&self, line: usize) -> &'a str {
        line.checked_sub(1)
            .and_then(|idx| self.source.get(idx))
            .copied()
            .unwrap_or("")
    }

    fn fail(&mut self, err: Error, line: usize, raw: &str) -> Failed {
        self.diags.push(Diag::error(err, line, raw));
        Failed {
            diags: std::mem::take(&mut self.diags),
        }
    }

    // ------------------------------------------------------------------------
    // Placement

    fn line(&mut self, line: usize, raw: &'a str) -> Result<(), Failed> {
        let mut stmt = Statement::parse(line, raw);

        if self.locator.ended() {
            if !stmt.comment && !self.trailing {
                self.trailing = true;
                let msg = "Statements after END are ignored".to_string();
                self.diags.push(Diag::warn(msg, line, raw));
            }
            return Ok(());
        }

        let kind = Kind::of(&stmt, self.optab);
        let placed = match self.locator.place(&mut stmt, kind) {
            Ok(placed) => placed,
            Err(err) => return Err(self.fail(err, line, raw)),
        };
        for err in placed.errors {
            self.diags.push(Diag::error(err, line, raw));
        }

        if let (Some(label), Some(addr)) = (stmt.label.clone(), stmt.addr()) {
            self.define(Name::Label(label), addr, line)?;
        }

        if let Kind::Directive(Directive::END) = kind {
            self.end_line = line;
            self.flushed(placed.literals, line)?;
            self.sequence(stmt)
        } else {
            self.sequence(stmt)?;
            self.flushed(placed.literals, line)
        }
    }

    fn define(&mut self, name: Name, addr: u32, line: usize) -> Result<(), Failed> {
        match self.symbols.define(name.clone(), addr, line) {
            Ok(drafts) => {
                for draft in drafts {
                    self.backpatch(draft)?;
                }
            }
            Err(err) => {
                let raw = self.raw(line);
                self.diags.push(Diag::error(err, line, raw));
                if let Some(prev) = self.symbols.line(&name) {
                    let raw = self.raw(prev);
                    let msg = format!("`{}` is first defined here", name);
                    self.diags.push(Diag::note(msg, prev, raw));
                }
            }
        }
        Ok(())
    }

    /// Define flushed literals and give each its own `BYTE` statement.
    fn flushed(&mut self, literals: Vec<Literal>, line: usize) -> Result<(), Failed> {
        for literal in literals {
            let Some(addr) = literal.addr else {
                continue;
            };
            self.define(literal.name(), addr, line)?;
            if !literal.value.is_empty() {
                self.sequence(Statement::literal(line, &literal.text, addr))?;
            }
        }
        Ok(())
    }

    fn sequence(&mut self, stmt: Statement) -> Result<(), Failed> {
        match self.mode {
            Mode::OnePass => self.emit(stmt),
            Mode::TwoPass => {
                self.queue.push(stmt);
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Encoding

    fn emit(&mut self, stmt: Statement) -> Result<(), Failed> {
        let kind = Kind::of(&stmt, self.optab);
        let code = match self.encode(&stmt, kind) {
            Ok(code) => code,
            Err(err) => return Err(self.fail(err, stmt.line, &stmt.raw)),
        };
        let in_memory = |addr: u32| addr as u64 + code.len() as u64 <= MEMORY as u64;
        if let (false, Some(addr)) = (stmt.comment, stmt.addr().filter(|&a| in_memory(a))) {
            self.emitter.push(addr, &code);
            if let Kind::Inst(_) = kind {
                self.sites.insert(addr, self.listing.len());
            }
        }
        self.listing.push(Listed { stmt, code });
        Ok(())
    }

    fn encode(&mut self, stmt: &Statement, kind: Kind) -> Result<Vec<u8>, Error> {
        let site = stmt.addr().unwrap_or(0);
        match kind {
            Kind::Comment | Kind::Invalid => Ok(vec![]),
            Kind::Directive(directive) => {
                match directive {
                    Directive::BYTE => return Ok(encode::byte(stmt)),
                    Directive::WORD => return Ok(encode::word(stmt)),
                    Directive::BASE => {
                        self.base = stmt
                            .operand(0)
                            .map(|operand| Base::parse(operand, &self.symbols));
                    }
                    Directive::NOBASE => self.base = None,
                    Directive::LTORG => self.pool += 1,
                    _ => {}
                }
                Ok(vec![])
            }
            Kind::Inst(op) => match op.format {
                Format::One => Ok(encode::format1(op).to_bin()),
                Format::Two => Ok(encode::format2(stmt, op)?.to_bin()),
                Format::ThreeFour => {
                    let draft = Draft::new(stmt, op, site, self.pool, self.base.clone());
                    if draft.relocatable() {
                        self.emitter.modify(site.wrapping_add(1), 5);
                    }
                    let placeholder = draft.placeholder();
                    Ok(self.settle(draft)?.unwrap_or(placeholder).to_bin())
                }
            },
        }
    }

    /// Complete `draft`, or park it on the symbol it waits for.
    fn settle(&mut self, mut draft: Draft) -> Result<Option<Inst>, Error> {
        loop {
            match draft.complete(&self.symbols)? {
                Step::Done(inst) => return Ok(Some(inst)),
                Step::Wait(name) => match self.mode {
                    Mode::TwoPass => return Err(Error::UndefinedSymbol(name.to_string())),
                    Mode::OnePass => match self.symbols.refer(name, draft) {
                        Some(back) => draft = back,
                        None => return Ok(None),
                    },
                },
            }
        }
    }

    fn backpatch(&mut self, draft: Draft) -> Result<(), Failed> {
        let (site, line) = (draft.site, draft.line);
        match self.settle(draft) {
            Ok(Some(inst)) => {
                let code = inst.to_bin();
                self.emitter.patch(site, &code);
                if let Some(&idx) = self.sites.get(&site) {
                    self.listing[idx].code = code;
                }
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                let raw = self.raw(line);
                Err(self.fail(err, line, raw))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Completion

    fn finish(mut self) -> Result<Assembly, Failed> {
        if !self.locator.started() {
            return Err(self.fail(Error::MissingStart, 0, ""));
        }

        if !self.locator.ended() {
            let line = self.source.len();
            let raw = self.raw(line);
            let msg = "END not found; assuming one after the last line".to_string();
            self.diags.push(Diag::warn(msg, line, raw));
            let mut end = Statement::parse(line, "\tEND");
            let placed = match self.locator.place(&mut end, Kind::Directive(Directive::END)) {
                Ok(placed) => placed,
                Err(err) => return Err(self.fail(err, line, raw)),
            };
            self.end_line = line;
            self.flushed(placed.literals, line)?;
        }

        for stmt in std::mem::take(&mut self.queue) {
            self.emit(stmt)?;
        }

        let pending = self
            .symbols
            .pending()
            .next()
            .map(|(name, symbol)| (name.to_string(), symbol.line));
        if let Some((name, line)) = pending {
            let raw = self.raw(line);
            return Err(self.fail(Error::UndefinedSymbol(name), line, raw));
        }

        let first = match self.locator.transfer().map(str::to_string) {
            Some(operand) => {
                let addr = self
                    .symbols
                    .address(&Name::Label(operand.clone()))
                    .or_else(|| parse_num(&operand).ok().map(|v| v as u32));
                match addr {
                    Some(addr) => addr,
                    None => {
                        let (line, raw) = (self.end_line, self.raw(self.end_line));
                        return Err(self.fail(Error::UndefinedSymbol(operand), line, raw));
                    }
                }
            }
            None => self.locator.first().unwrap_or(self.locator.start()),
        };

        let program = std::mem::take(&mut self.emitter).finish(
            self.locator.name(),
            self.locator.start(),
            self.locator.length(),
            first,
        );
        Ok(Assembly {
            program,
            listing: self.listing,
            symbols: self.symbols,
            diags: self.diags,
        })
    }
}
