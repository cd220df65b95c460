use num_enum::IntoPrimitive;
use strum::EnumString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, EnumString)]
#[repr(u8)]
pub enum Reg {
    A = 0,
    X = 1,
    L = 2,
    B = 3,
    S = 4,
    T = 5,
    F = 6,
    PC = 8,
    SW = 9,
}

impl Reg {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_uppercase().parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }

    /// Register number as it appears in a format 2 nibble.
    pub fn num(self) -> u8 {
        self.into()
    }
}
