pub mod assembler;
pub mod config;
pub mod encode;
pub mod error;
pub mod listing;
pub mod literal;
pub mod locate;
pub mod msg;
pub mod parser;
pub mod record;
pub mod symbol;

pub use assembler::{assemble, Assembly, Listed, Mode};
pub use config::Config;
pub use error::Error;
pub use msg::{Diag, Failed, Level};
pub use record::{ObjectProgram, Record};
