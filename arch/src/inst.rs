// ----------------------------------------------------------------------------
// nixbpe

pub struct Flag;

impl Flag {
    pub const N: u8 = 0b10_0000;
    pub const I: u8 = 0b01_0000;
    pub const X: u8 = 0b00_1000;
    pub const B: u8 = 0b00_0100;
    pub const P: u8 = 0b00_0010;
    pub const E: u8 = 0b00_0001;
}

pub const DISP_MAX: u32 = 0xFFF;
pub const ADDR_MAX: u32 = 0xFFFFF;

// ----------------------------------------------------------------------------
// Instruction word

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    /// opcode
    F1(u8),
    /// opcode, r1, r2
    F2(u8, u8, u8),
    /// opcode, nixbpe, 12-bit displacement
    F3(u8, u8, u16),
    /// opcode, nixbpe, 20-bit address
    F4(u8, u8, u32),
}

impl Inst {
    pub fn to_bin(&self) -> Vec<u8> {
        match *self {
            Inst::F1(op) => vec![op],
            Inst::F2(op, r1, r2) => vec![op, (r1 & 0xF) << 4 | (r2 & 0xF)],
            Inst::F3(op, flags, disp) => {
                let word = (op as u32 & 0xFC) << 16
                    | (flags as u32 & 0x3F) << 12
                    | (disp as u32 & DISP_MAX);
                word.to_be_bytes()[1..].to_vec()
            }
            Inst::F4(op, flags, addr) => {
                let word = (op as u32 & 0xFC) << 24
                    | (flags as u32 & 0x3F) << 20
                    | (addr & ADDR_MAX);
                word.to_be_bytes().to_vec()
            }
        }
    }
}
