use clap::{Args, Parser, Subcommand};

use crate::tables;

/// Configure SR-FRS / SA818 style VHF/UHF transceiver modules over a
/// serial port.
#[derive(Debug, Parser)]
#[command(name = "sr-frs", version, about, after_help = tables::format_codes())]
pub struct Cli {
    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Serial port of the module; the usual candidates are scanned
    /// when omitted.
    #[arg(long, global = true)]
    pub port: Option<String>,

    /// Walk the list of speculative commands and report which ones the
    /// firmware answers, instead of running the subcommand.
    #[arg(long, global = true)]
    pub probe: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Program frequency, tone and squelch.
    Radio(RadioArgs),
    /// Set the audio output level.
    Volume(VolumeArgs),
    /// Enable or disable the audio filters.
    Filters(FilterArgs),
    /// Query the firmware version.
    Version,
    /// Query the programmed group settings.
    Group,
}

#[derive(Debug, Args)]
pub struct RadioArgs {
    /// Receive frequency in MHz (136-174 or 400-470).
    #[arg(long, value_parser = tables::parse_frequency)]
    pub frequency: Option<f64>,

    /// Transmit offset in MHz, added to the receive frequency.
    #[arg(long, allow_hyphen_values = true)]
    pub offset: Option<f64>,

    /// Squelch level, 0 (open) to 8.
    #[arg(long, value_parser = tables::parse_squelch)]
    pub squelch: Option<u8>,

    /// CTCSS tone in Hz, or "none".
    #[arg(long, value_parser = tables::parse_ctcss, conflicts_with = "dcs")]
    pub ctcss: Option<String>,

    /// DCS code with N or I suffix, e.g. 047I.
    #[arg(long, value_parser = tables::parse_dcs)]
    pub dcs: Option<String>,

    /// Eliminate the CTCSS tail tone (yes/no). Only meaningful
    /// together with a CTCSS tone.
    #[arg(long = "close-tail", value_parser = tables::parse_yesno)]
    pub close_tail: Option<bool>,
}

#[derive(Debug, Args)]
pub struct VolumeArgs {
    /// Volume level, 1 to 8.
    #[arg(long, value_parser = tables::parse_volume)]
    pub level: Option<u8>,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Enable/disable pre/de-emphasis (yes/no).
    #[arg(long, value_parser = tables::parse_yesno)]
    pub emphasis: Option<bool>,

    /// Enable/disable the high-pass filter (yes/no).
    #[arg(long, value_parser = tables::parse_yesno)]
    pub highpass: Option<bool>,

    /// Enable/disable the low-pass filter (yes/no).
    #[arg(long, value_parser = tables::parse_yesno)]
    pub lowpass: Option<bool>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_radio_args() {
        let cli = Cli::parse_from([
            "sr-frs",
            "radio",
            "--frequency",
            "145.5",
            "--offset",
            "-0.6",
            "--squelch",
            "4",
            "--ctcss",
            "100.0",
            "--close-tail",
            "yes",
        ]);
        let Some(CliCommand::Radio(args)) = cli.command else {
            panic!("expected radio subcommand");
        };
        assert_eq!(args.frequency, Some(145.5));
        assert_eq!(args.offset, Some(-0.6));
        assert_eq!(args.squelch, Some(4));
        assert_eq!(args.ctcss.as_deref(), Some("12"));
        assert_eq!(args.close_tail, Some(true));
    }

    #[test]
    fn test_ctcss_conflicts_with_dcs() {
        let result = Cli::try_parse_from([
            "sr-frs", "radio", "--ctcss", "100.0", "--dcs", "047N",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_frequency_rejected() {
        let result = Cli::try_parse_from(["sr-frs", "radio", "--frequency", "27.185"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["sr-frs", "version", "--debug", "--port", "/dev/ttyAMA0"]);
        assert!(cli.debug);
        assert_eq!(cli.port.as_deref(), Some("/dev/ttyAMA0"));
        assert!(matches!(cli.command, Some(CliCommand::Version)));
    }

    #[test]
    fn test_probe_without_subcommand_parses() {
        let cli = Cli::parse_from(["sr-frs", "--probe"]);
        assert!(cli.probe);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_dcs_normalized() {
        let cli = Cli::parse_from(["sr-frs", "radio", "--dcs", "47N"]);
        let Some(CliCommand::Radio(args)) = cli.command else {
            panic!("expected radio subcommand");
        };
        assert_eq!(args.dcs.as_deref(), Some("047N"));
    }
}
