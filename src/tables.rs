use crate::error::{FrsError, Result};

/// CTCSS (PL) tones in device index order. The wire tone field for a
/// CTCSS entry is its zero-padded index into this table; index 0 means
/// no tone.
pub const CTCSS: [&str; 39] = [
    "None", "67.0", "71.9", "74.4", "77.0", "79.7", "82.5", "85.4", "88.5", "91.5",
    "94.8", "97.4", "100.0", "103.5", "107.2", "110.9", "114.8", "118.8", "123.0",
    "127.3", "131.8", "136.5", "141.3", "146.2", "151.4", "156.7", "162.2",
    "167.9", "173.8", "179.9", "186.2", "192.8", "203.5", "210.7", "218.1",
    "225.7", "233.6", "241.8", "250.3",
];

/// DCS codes accepted by the device. Each is used with an `N` (normal)
/// or `I` (inverse) suffix on the wire.
pub const DCS_CODES: [&str; 104] = [
    "023", "025", "026", "031", "032", "036", "043", "047", "051", "053", "054", "065", "071",
    "072", "073", "074", "114", "115", "116", "122", "125", "131", "132", "134", "143", "145",
    "152", "155", "156", "162", "165", "172", "174", "205", "212", "223", "225", "226", "243",
    "244", "245", "246", "251", "252", "255", "261", "263", "265", "266", "271", "274", "306",
    "311", "315", "325", "331", "332", "343", "346", "351", "356", "364", "365", "371", "411",
    "412", "413", "423", "431", "432", "445", "446", "452", "454", "455", "462", "464", "465",
    "466", "503", "506", "516", "523", "526", "532", "546", "565", "606", "612", "624", "627",
    "631", "632", "654", "662", "664", "703", "712", "723", "731", "732", "734", "743", "754",
];

/// Validate a receive frequency in MHz.
///
/// The device covers 136-174 MHz and 400-470 MHz, both ranges exclusive
/// at the edges.
pub fn parse_frequency(s: &str) -> Result<f64> {
    let frequency: f64 = s
        .parse()
        .map_err(|_| FrsError::FrequencyOutOfRange(f64::NAN))?;
    if !(136.0 < frequency && frequency < 174.0) && !(400.0 < frequency && frequency < 470.0) {
        return Err(FrsError::FrequencyOutOfRange(frequency));
    }
    Ok(frequency)
}

/// Validate a CTCSS tone string and convert it to its 2-digit wire index.
///
/// `"100.0"` becomes `"12"`; `"none"` (any case) becomes `"00"`.
pub fn parse_ctcss(s: &str) -> Result<String> {
    if s.eq_ignore_ascii_case("none") {
        return Ok("00".to_string());
    }
    let tone: f64 = s.parse().map_err(|_| FrsError::UnknownCtcss(s.to_string()))?;
    let normalized = format!("{tone:.1}");
    let index = CTCSS
        .iter()
        .position(|&t| t == normalized)
        .ok_or_else(|| FrsError::UnknownCtcss(s.to_string()))?;
    Ok(format!("{index:02}"))
}

/// Look up the CTCSS tone string for a device tone index.
pub fn ctcss_tone(index: usize) -> Option<&'static str> {
    CTCSS.get(index).copied()
}

/// Validate a DCS code of the form `<code><N|I>` (e.g. `047I`) and
/// return it with the code part zero-padded to 3 digits.
pub fn parse_dcs(s: &str) -> Result<String> {
    let direction = match s.chars().last() {
        Some(c @ ('N' | 'I')) => c,
        _ => return Err(FrsError::InvalidDcs(s.to_string())),
    };
    // The suffix is ASCII, so the byte split is safe.
    let code: u16 = s[..s.len() - 1]
        .parse()
        .map_err(|_| FrsError::InvalidDcs(s.to_string()))?;
    let code = format!("{code:03}");
    if !DCS_CODES.contains(&code.as_str()) {
        return Err(FrsError::InvalidDcs(s.to_string()));
    }
    Ok(format!("{code}{direction}"))
}

/// Validate a squelch level (0 to 8 inclusive).
pub fn parse_squelch(s: &str) -> Result<u8> {
    parse_range(s, 0, 8)
}

/// Validate a volume level (1 to 8 inclusive).
pub fn parse_volume(s: &str) -> Result<u8> {
    parse_range(s, 1, 8)
}

fn parse_range(s: &str, min: i64, max: i64) -> Result<u8> {
    let value: i64 = s.parse().map_err(|_| FrsError::ValueOutOfRange {
        value: i64::MIN,
        min,
        max,
    })?;
    if value < min || value > max {
        return Err(FrsError::ValueOutOfRange { value, min, max });
    }
    Ok(value as u8)
}

/// Parse a yes/no style boolean argument.
pub fn parse_yesno(s: &str) -> Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" | "on" => Ok(true),
        "n" | "no" | "false" | "0" | "off" => Ok(false),
        _ => Err(FrsError::InvalidYesNo(s.to_string())),
    }
}

/// Format the CTCSS and DCS reference tables for the CLI help epilog.
pub fn format_codes() -> String {
    let mut out = String::from("CTCSS codes (PL Tones):\n");
    out.push_str(&wrap_list(&CTCSS[1..]));
    out.push_str("\n\nDCS Codes:\n");
    out.push_str("DCS codes must be followed by N or I for Normal or Inverse:\n");
    out.push_str("> Example: 047I\n");
    out.push_str(&wrap_list(&DCS_CODES));
    out
}

/// Join entries with ", " and wrap at roughly 70 columns.
fn wrap_list(entries: &[&str]) -> String {
    let mut out = String::new();
    let mut line_len = 0;
    for (i, entry) in entries.iter().enumerate() {
        if i == 0 {
            out.push_str(entry);
            line_len = entry.len();
        } else if line_len + 2 + entry.len() > 70 {
            out.push_str(",\n");
            out.push_str(entry);
            line_len = entry.len();
        } else {
            out.push_str(", ");
            out.push_str(entry);
            line_len += 2 + entry.len();
        }
    }
    out
}
