use std::fmt;

/// Wire opcodes understood by the module.
pub mod opcode {
    /// Handshake, sent once after opening the port.
    pub const CONNECT: &str = "AT+DMOCONNECT";
    /// Program frequency, tone and squelch in one group.
    pub const SET_GROUP: &str = "AT+DMOSETGROUP";
    /// Enable/disable the audio filters.
    pub const SET_FILTER: &str = "AT+SETFILTER";
    /// Set the audio output level.
    pub const SET_VOLUME: &str = "AT+DMOSETVOLUME";
    /// Enable/disable CTCSS tail tone elimination.
    pub const SET_TAIL: &str = "AT+SETTAIL";
    /// Query the firmware version.
    pub const VERSION_QUERY: &str = "AT+DMOVERQ";
    /// Query the programmed group settings.
    pub const GROUP_QUERY: &str = "AT+DMOGETGROUP";
}

/// Channel bandwidth for the group command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bandwidth {
    Narrow,
    Wide,
}

impl Bandwidth {
    pub fn wire_digit(self) -> u8 {
        match self {
            Bandwidth::Narrow => 0,
            Bandwidth::Wide => 1,
        }
    }
}

/// The tone field of a group command.
///
/// On the wire this is `"00"` for no tone, a 2-digit CTCSS table index,
/// or a 3-digit DCS code followed by `N` or `I`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tone {
    None,
    /// CTCSS tone, stored as its index into [`crate::tables::CTCSS`].
    Ctcss(u8),
    /// DCS code with direction suffix, e.g. `"047I"`.
    Dcs(String),
}

impl Tone {
    pub fn wire_field(&self) -> String {
        match self {
            Tone::None => "00".to_string(),
            Tone::Ctcss(index) => format!("{index:02}"),
            Tone::Dcs(code) => code.clone(),
        }
    }

    pub fn is_ctcss(&self) -> bool {
        matches!(self, Tone::Ctcss(_))
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::None => write!(f, "none"),
            Tone::Ctcss(index) => match crate::tables::ctcss_tone(*index as usize) {
                Some(tone) => write!(f, "ctcss {tone}"),
                None => write!(f, "ctcss #{index}"),
            },
            Tone::Dcs(code) => write!(f, "dcs {code}"),
        }
    }
}

/// A command to send to the module.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Handshake.
    Connect,
    /// Program frequency/tone/squelch. Frequencies are in MHz and are
    /// formatted to 4 decimal places on the wire.
    SetGroup {
        bandwidth: Bandwidth,
        tx_mhz: f64,
        rx_mhz: f64,
        tone: Tone,
        squelch: u8,
    },
    /// Set the audio filters. The wire sense is inverted: a `1` digit
    /// disables the filter, a `0` digit enables it.
    SetFilter {
        emphasis: bool,
        highpass: bool,
        lowpass: bool,
    },
    /// Set the volume level (1 to 8).
    SetVolume(u8),
    /// Enable/disable closing of the CTCSS tail tone.
    SetTail(bool),
    /// Query the firmware version.
    VersionQuery,
    /// Query the programmed group settings.
    GroupQuery,
}

impl Command {
    /// Encode this command to its wire string (without the CRLF
    /// terminator, which the transport appends).
    ///
    /// Field order and separators are exact; the device rejects or
    /// misinterprets anything else.
    pub fn encode(&self) -> String {
        match self {
            Command::Connect => opcode::CONNECT.to_string(),
            Command::SetGroup {
                bandwidth,
                tx_mhz,
                rx_mhz,
                tone,
                squelch,
            } => {
                let tone = tone.wire_field();
                format!(
                    "{}={},{:.4},{:.4},{},{},{},1",
                    opcode::SET_GROUP,
                    bandwidth.wire_digit(),
                    tx_mhz,
                    rx_mhz,
                    tone,
                    squelch,
                    tone,
                )
            }
            Command::SetFilter {
                emphasis,
                highpass,
                lowpass,
            } => format!(
                "{}={},{},{}",
                opcode::SET_FILTER,
                u8::from(!emphasis),
                u8::from(!highpass),
                u8::from(!lowpass),
            ),
            Command::SetVolume(level) => format!("{}={level}", opcode::SET_VOLUME),
            Command::SetTail(close) => format!("{}={}", opcode::SET_TAIL, u8::from(*close)),
            Command::VersionQuery => opcode::VERSION_QUERY.to_string(),
            Command::GroupQuery => opcode::GROUP_QUERY.to_string(),
        }
    }

    /// The reply prefix expected for this command.
    ///
    /// Note the asymmetry for the filter command: `AT+SETFILTER` is
    /// acknowledged as `+DMOSETFILTER`.
    pub fn reply_prefix(&self) -> &'static str {
        match self {
            Command::Connect => "+DMOCONNECT",
            Command::SetGroup { .. } => "+DMOSETGROUP",
            Command::SetFilter { .. } => "+DMOSETFILTER",
            Command::SetVolume(_) => "+DMOSETVOLUME",
            Command::SetTail(_) => "+DMOSETTAIL",
            Command::VersionQuery => "+DMOVERQ",
            Command::GroupQuery => "+DMOGETGROUP",
        }
    }
}
