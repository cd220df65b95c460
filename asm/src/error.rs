use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Directive START not found")]
    MissingStart,

    #[error("START must be the first statement")]
    MisplacedStart,

    #[error("Duplicate symbol: `{0}`")]
    DuplicateSymbol(String),

    #[error("Invalid operation code: `{0}`")]
    InvalidOperation(String),

    #[error("Undefined symbol: `{0}`")]
    UndefinedSymbol(String),

    #[error("Malformed constant: `{0}`")]
    MalformedConstant(String),

    #[error("Cannot parse `{0}` as number")]
    InvalidNumber(String),

    #[error("Unknown register: `{0}`")]
    InvalidRegister(String),

    #[error("More operand required: `{0}`")]
    MissingOperand(String),

    #[error("Address `{0}` is beyond the end of memory")]
    AddressOverflow(String),

    #[error("`{0}` is out of range for {1}")]
    DisplacementOutOfRange(String, String),

    #[error("Operation table: {0}")]
    OpTable(String),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read file: {0}")]
    FileRead(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String, #[source] serde_yaml::Error),
}
