use thiserror::Error;

pub type Result<T> = std::result::Result<T, FrsError>;

#[derive(Debug, Error)]
pub enum FrsError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no serial port could be opened (tried: {0})")]
    NoPortFound(String),

    #[error("device did not answer the handshake")]
    Handshake,

    #[error("serial connection lost")]
    ConnectionLost,

    #[error("timeout waiting for reply")]
    Timeout,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("frequency {0} MHz is outside the 136-174 / 400-470 MHz bands")]
    FrequencyOutOfRange(f64),

    #[error("unknown CTCSS tone: {0}")]
    UnknownCtcss(String),

    #[error("invalid DCS code (3 digits followed by N or I, e.g. 047I): {0}")]
    InvalidDcs(String),

    #[error("value {value} is outside {min}..={max}")]
    ValueOutOfRange { value: i64, min: i64, max: i64 },

    #[error("expected yes or no, got {0:?}")]
    InvalidYesNo(String),

    #[error("no frequency given and none saved; use --frequency")]
    MissingFrequency,
}
