use arch::op::{OpTable, SICXE};
use serde::Deserialize;
use std::{fs::File, io::Read};

use crate::{assembler::Mode, error::Error};

/// Options read from a YAML file. Command-line flags take precedence.
///
/// ```yaml
/// optab: optab.txt
/// mode: one-pass
/// dump: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub optab: Option<String>,
    pub mode: Mode,
    pub dump: bool,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Error> {
        let text = read(path)?;
        Config::parse(&text).map_err(|e| match e {
            Error::Config(_, source) => Error::Config(path.to_string(), source),
            other => other,
        })
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        if text.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(text).map_err(|e| Error::Config("<inline>".to_string(), e))
    }
}

/// Operation table from `path`, or the built-in one.
pub fn load_optab(path: Option<&str>) -> Result<OpTable, Error> {
    match path {
        None => Ok(SICXE.clone()),
        Some(path) => {
            let text = read(path)?;
            OpTable::parse(&text).map_err(|e| Error::OpTable(format!("{}: {}", path, e)))
        }
    }
}

pub fn read(path: &str) -> Result<String, Error> {
    let mut file = File::open(path).map_err(|e| Error::FileOpen(path.to_string(), e))?;
    let mut text = String::new();
    file.read_to_string(&mut text)
        .map_err(|e| Error::FileRead(path.to_string(), e))?;
    Ok(text)
}
