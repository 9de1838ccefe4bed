use crate::command::{Bandwidth, Command};
use crate::error::{FrsError, Result};
use crate::tables;

/// A typed reply from the module.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// The issued command was acknowledged with status 0.
    Ack,
    /// Firmware version string (reply to VersionQuery).
    Version(String),
    /// Programmed group settings (reply to GroupQuery).
    Group(GroupReport),
}

/// Decoded group-query reply.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupReport {
    pub bandwidth: Bandwidth,
    pub tx_mhz: f64,
    pub rx_mhz: f64,
    /// CTCSS tone string, `None` when no tone is programmed.
    pub tone: Option<&'static str>,
    pub squelch: u8,
}

/// Parse a reply line into a typed [`Response`], using the issued
/// [`Command`] to select the expected prefix and reply shape.
///
/// A reply whose prefix does not match the issued command, or whose
/// body cannot be decoded, is a protocol error, never a panic.
pub fn parse_response(line: &str, command: &Command) -> Result<Response> {
    let prefix = command.reply_prefix();
    let body = line
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or_else(|| {
            FrsError::Protocol(format!("expected {prefix} reply, got {line:?}"))
        })?;

    match command {
        Command::VersionQuery => parse_version(body),
        Command::GroupQuery => parse_group(line),
        _ => parse_ack(body, prefix),
    }
}

/// Parse the status code of an acknowledgement reply. Status 0 is
/// success; anything else is a device-side rejection.
fn parse_ack(body: &str, prefix: &str) -> Result<Response> {
    let status: u8 = body
        .parse()
        .map_err(|_| FrsError::Protocol(format!("unparsable {prefix} status: {body:?}")))?;
    if status != 0 {
        return Err(FrsError::Protocol(format!(
            "{prefix} returned status {status}"
        )));
    }
    Ok(Response::Ack)
}

fn parse_version(body: &str) -> Result<Response> {
    if body.is_empty() {
        return Err(FrsError::Protocol("empty version reply".to_string()));
    }
    Ok(Response::Version(body.to_string()))
}

/// Decode the 8-field group-query reply.
///
/// Counting the prefix-bearing first field, field 2 is the bandwidth
/// (`"1"` = wide), fields 3/4 the tx/rx frequencies in MHz, field 5
/// the tone index (`"00"` = none) and field 6 the squelch level.
fn parse_group(line: &str) -> Result<Response> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 8 {
        return Err(FrsError::Protocol(format!(
            "group reply has {} fields, expected 8: {line:?}",
            fields.len()
        )));
    }

    let bandwidth = if fields[1] == "1" {
        Bandwidth::Wide
    } else {
        Bandwidth::Narrow
    };
    let tx_mhz: f64 = fields[2]
        .parse()
        .map_err(|_| FrsError::Protocol(format!("bad tx frequency: {:?}", fields[2])))?;
    let rx_mhz: f64 = fields[3]
        .parse()
        .map_err(|_| FrsError::Protocol(format!("bad rx frequency: {:?}", fields[3])))?;

    let tone = if fields[4] == "00" {
        None
    } else {
        let index: usize = fields[4]
            .parse()
            .map_err(|_| FrsError::Protocol(format!("bad tone index: {:?}", fields[4])))?;
        let tone = tables::ctcss_tone(index).ok_or_else(|| {
            FrsError::Protocol(format!("tone index {index} outside the CTCSS table"))
        })?;
        Some(tone)
    };

    let squelch: u8 = fields[5]
        .parse()
        .map_err(|_| FrsError::Protocol(format!("bad squelch: {:?}", fields[5])))?;

    Ok(Response::Group(GroupReport {
        bandwidth,
        tx_mhz,
        rx_mhz,
        tone,
        squelch,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Tone;

    fn set_group() -> Command {
        Command::SetGroup {
            bandwidth: Bandwidth::Wide,
            tx_mhz: 145.5,
            rx_mhz: 145.5,
            tone: Tone::None,
            squelch: 4,
        }
    }

    #[test]
    fn test_ack_success() {
        let resp = parse_response("+DMOSETGROUP:0", &set_group()).unwrap();
        assert_eq!(resp, Response::Ack);
    }

    #[test]
    fn test_ack_connect() {
        let resp = parse_response("+DMOCONNECT:0", &Command::Connect).unwrap();
        assert_eq!(resp, Response::Ack);
    }

    #[test]
    fn test_ack_nonzero_status() {
        let err = parse_response("+DMOSETGROUP:1", &set_group()).unwrap_err();
        assert!(matches!(err, FrsError::Protocol(_)));
    }

    #[test]
    fn test_prefix_mismatch() {
        let err = parse_response("+DMOSETVOLUME:0", &set_group()).unwrap_err();
        assert!(matches!(err, FrsError::Protocol(_)));
    }

    #[test]
    fn test_garbled_line() {
        assert!(parse_response("", &Command::Connect).is_err());
        assert!(parse_response("garbage", &Command::Connect).is_err());
        assert!(parse_response("+DMOCONNECT:zz", &Command::Connect).is_err());
    }

    #[test]
    fn test_filter_ack_prefix_asymmetry() {
        let cmd = Command::SetFilter {
            emphasis: true,
            highpass: true,
            lowpass: true,
        };
        let resp = parse_response("+DMOSETFILTER:0", &cmd).unwrap();
        assert_eq!(resp, Response::Ack);
        // The command opcode itself is not a valid reply prefix.
        assert!(parse_response("+SETFILTER:0", &cmd).is_err());
    }

    #[test]
    fn test_version() {
        let resp = parse_response("+DMOVERQ:SR_FRS_1W_V1.7", &Command::VersionQuery).unwrap();
        assert_eq!(resp, Response::Version("SR_FRS_1W_V1.7".to_string()));
    }

    #[test]
    fn test_version_empty() {
        assert!(parse_response("+DMOVERQ:", &Command::VersionQuery).is_err());
    }

    #[test]
    fn test_group_report() {
        let resp = parse_response(
            "+DMOGETGROUP:0,1,146.1000,145.5000,13,4,00,1",
            &Command::GroupQuery,
        )
        .unwrap();
        assert_eq!(
            resp,
            Response::Group(GroupReport {
                bandwidth: Bandwidth::Wide,
                tx_mhz: 146.1,
                rx_mhz: 145.5,
                tone: Some("103.5"),
                squelch: 4,
            })
        );
    }

    #[test]
    fn test_group_report_no_tone_narrow() {
        let resp = parse_response(
            "+DMOGETGROUP:0,0,446.5000,446.5000,00,8,00,1",
            &Command::GroupQuery,
        )
        .unwrap();
        let Response::Group(report) = resp else {
            panic!("expected group report");
        };
        assert_eq!(report.bandwidth, Bandwidth::Narrow);
        assert_eq!(report.tone, None);
        assert_eq!(report.squelch, 8);
    }

    #[test]
    fn test_group_report_wrong_field_count() {
        let err = parse_response("+DMOGETGROUP:0,1,145.5000", &Command::GroupQuery).unwrap_err();
        assert!(matches!(err, FrsError::Protocol(_)));
    }

    #[test]
    fn test_group_report_tone_index_out_of_table() {
        let err = parse_response(
            "+DMOGETGROUP:0,1,145.5000,145.5000,99,4,00,1",
            &Command::GroupQuery,
        )
        .unwrap_err();
        assert!(matches!(err, FrsError::Protocol(_)));
    }
}
