use std::process::exit;

use clap::Parser;
use log::{error, info};

use sr_frs::cli::{Cli, CliCommand};
use sr_frs::radio::{FilterParams, RadioParams};
use sr_frs::settings::DEFAULT_SETTINGS_PATH;
use sr_frs::{FrsError, Radio, SettingsStore};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let Some(command) = cli.command else {
        error!("no subcommand given; see --help");
        exit(1);
    };

    let store = SettingsStore::load(DEFAULT_SETTINGS_PATH);
    let mut radio = match Radio::connect(cli.port.as_deref(), store) {
        Ok(radio) => radio,
        Err(e) => {
            error!("could not connect to the module: {e}");
            exit(1);
        }
    };

    if cli.probe {
        match radio.probe() {
            Ok(results) => {
                for (probe, supported) in results {
                    info!(
                        "{probe}: {}",
                        if supported { "supported" } else { "unsupported" }
                    );
                }
            }
            Err(e) => {
                error!("probe aborted: {e}");
                exit(1);
            }
        }
        return;
    }

    let result = match command {
        CliCommand::Radio(args) => radio.set_radio(&RadioParams {
            frequency: args.frequency,
            offset: args.offset,
            squelch: args.squelch,
            ctcss: args.ctcss,
            dcs: args.dcs,
            close_tail: args.close_tail,
        }),
        CliCommand::Volume(args) => radio.set_volume(args.level),
        CliCommand::Filters(args) => radio.set_filters(&FilterParams {
            emphasis: args.emphasis,
            highpass: args.highpass,
            lowpass: args.lowpass,
        }),
        CliCommand::Version => radio.version().map(|_| ()),
        CliCommand::Group => radio.group().map(|report| {
            let tone = report.tone.unwrap_or("none");
            info!(
                "group: rx {:.4} MHz, tx {:.4} MHz, tone {tone}, squelch {}",
                report.rx_mhz, report.tx_mhz, report.squelch
            );
        }),
    };

    match result {
        Ok(()) => {}
        Err(e @ FrsError::ConnectionLost) => {
            error!("{e}");
            exit(1);
        }
        Err(e) => error!("{e}"),
    }
}
