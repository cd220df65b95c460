use color_print::cprintln;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warn,
    Note,
}

/// A message tied to one source line.
#[derive(Debug)]
pub struct Diag {
    pub level: Level,
    pub msg: String,
    pub error: Option<Error>,
    pub line: usize,
    pub raw: String,
}

impl Diag {
    pub fn error(error: Error, line: usize, raw: &str) -> Self {
        Diag {
            level: Level::Error,
            msg: error.to_string(),
            error: Some(error),
            line,
            raw: raw.to_string(),
        }
    }

    pub fn warn(msg: String, line: usize, raw: &str) -> Self {
        Diag {
            level: Level::Warn,
            msg,
            error: None,
            line,
            raw: raw.to_string(),
        }
    }

    pub fn note(msg: String, line: usize, raw: &str) -> Self {
        Diag {
            level: Level::Note,
            msg,
            error: None,
            line,
            raw: raw.to_string(),
        }
    }

    pub fn print(&self, path: &str) {
        match self.level {
            Level::Error => cprintln!("<red,bold>error</>: {}", self.msg),
            Level::Warn => cprintln!("<yellow,bold>warn</>: {}", self.msg),
            Level::Note => cprintln!("<green,bold>note</>: {}", self.msg),
        }
        cprintln!("     <blue>--></> <underline>{}:{}</>", path, self.line);
        cprintln!("      <blue>|</>");
        cprintln!(" <blue>{:>4} |</> {}", self.line, self.raw);
        cprintln!("      <blue>|</>");
    }
}

pub fn dump(diags: &[Diag], path: &str) {
    for diag in diags {
        diag.print(path);
    }
}

pub fn has_error(diags: &[Diag]) -> bool {
    diags.iter().any(|diag| diag.level == Level::Error)
}

/// A run stopped by a fatal error. `diags` ends with the fatal one.
#[derive(Debug)]
pub struct Failed {
    pub diags: Vec<Diag>,
}

impl Failed {
    pub fn error(&self) -> Option<&Error> {
        self.diags.last().and_then(|diag| diag.error.as_ref())
    }
}
