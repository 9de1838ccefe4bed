use log::{error, info, warn};

use crate::command::{Bandwidth, Command, Tone};
use crate::error::{FrsError, Result};
use crate::response::{GroupReport, Response, parse_response};
use crate::settings::{FilterSettings, RadioSettings, SettingsStore};
use crate::transport::{SerialTransport, Transport, locate_port};

/// Squelch level used when none is given and none is saved.
pub const DEFAULT_SQUELCH: u8 = 4;
/// Volume level used when none is given and none is saved.
pub const DEFAULT_VOLUME: u8 = 4;

/// Speculative commands sent by probe mode, in order.
pub const PROBE_COMMANDS: &[&str] = &[
    "AT+DMOGETGROUP?",
    "AT+DMOGETGROUP=?",
    "AT+DMOGETGROUP",
    "AT+DMOSETGROUP?",
    "AT+DMOSETGROUP=?",
    "AT+DMOSETGROUP",
    "AT+DMOVERQ?",
    "AT+DMOLIST?",
    "AT+DMOHELP?",
    "AT+DMOSTORE?",
    "AT+DMOLOAD?",
    "AT+DMOFACTORYRESET?",
    "AT+DMODEBUGON?",
    "AT+DMODEBUGOFF?",
    "AT+DMONOTIFY?",
    "AT+DMOINFO?",
    "AT+DMOGETPOWER?",
    "AT+DMOGETFREQ?",
    "AT+DMODEBUG?",
    "AT+CIPSTATUS",
];

/// Connection lifecycle of the controller.
///
/// `Busy` is entered for the duration of one command/reply exchange;
/// a hard I/O failure while busy drops the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Handshaking,
    Ready,
    Busy,
}

/// Parameters for the group (frequency/tone/squelch) operation.
/// `None` fields fall back to the saved setting, then to the default.
#[derive(Debug, Clone, Default)]
pub struct RadioParams {
    pub frequency: Option<f64>,
    pub offset: Option<f64>,
    pub squelch: Option<u8>,
    /// 2-digit CTCSS index, as produced by [`crate::tables::parse_ctcss`].
    pub ctcss: Option<String>,
    /// DCS code + direction, as produced by [`crate::tables::parse_dcs`].
    pub dcs: Option<String>,
    pub close_tail: Option<bool>,
}

/// Parameters for the filter operation; `None` falls back to the saved
/// filter switches (all disabled when never configured).
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterParams {
    pub emphasis: Option<bool>,
    pub highpass: Option<bool>,
    pub lowpass: Option<bool>,
}

/// A connection to the transceiver module.
///
/// Owns the transport and the settings store exclusively; exactly one
/// command is in flight at a time, and the reply (or timeout) for a
/// command is always consumed before the next send.
#[derive(Debug)]
pub struct Radio<T: Transport> {
    transport: T,
    store: SettingsStore,
    state: ConnectionState,
}

impl Radio<SerialTransport> {
    /// Locate and open the module's serial port, then handshake.
    ///
    /// With `port` given only that port is attempted, otherwise the
    /// platform candidate list is scanned.
    pub fn connect(port: Option<&str>, store: SettingsStore) -> Result<Self> {
        let transport = locate_port(port)?;
        Self::with_transport(transport, store)
    }
}

impl<T: Transport> Radio<T> {
    /// Handshake with the device over an already-open transport.
    pub fn with_transport(transport: T, store: SettingsStore) -> Result<Self> {
        let mut radio = Self {
            transport,
            store,
            state: ConnectionState::Connecting,
        };

        radio.state = ConnectionState::Handshaking;
        let handshake = Command::Connect;
        let result = radio
            .transport
            .send_line(&handshake.encode())
            .and_then(|_| radio.transport.read_line())
            .and_then(|reply| parse_response(&reply, &handshake));

        match result {
            Ok(Response::Ack) => {
                info!("device answered the handshake");
                radio.state = ConnectionState::Ready;
                Ok(radio)
            }
            Ok(other) => {
                error!("unexpected handshake reply: {other:?}");
                Err(FrsError::Handshake)
            }
            Err(e) => {
                error!("handshake failed: {e}");
                Err(FrsError::Handshake)
            }
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The last-applied settings, as loaded or committed so far.
    pub fn settings(&self) -> &RadioSettings {
        self.store.current()
    }

    /// Send one command and wait for its reply.
    ///
    /// Timeouts and protocol errors leave the connection usable; a
    /// hard I/O failure drops it and every later call fails fast.
    fn exchange(&mut self, command: &Command) -> Result<Response> {
        if self.state != ConnectionState::Ready {
            return Err(FrsError::ConnectionLost);
        }
        self.state = ConnectionState::Busy;

        if let Err(e) = self.transport.send_line(&command.encode()) {
            error!("write failed, dropping connection: {e}");
            self.state = ConnectionState::Disconnected;
            return Err(FrsError::ConnectionLost);
        }

        let reply = match self.transport.read_line() {
            Ok(reply) => reply,
            Err(FrsError::Timeout) => {
                self.state = ConnectionState::Ready;
                return Err(FrsError::Timeout);
            }
            Err(e) => {
                error!("read failed, dropping connection: {e}");
                self.state = ConnectionState::Disconnected;
                return Err(FrsError::ConnectionLost);
            }
        };

        self.state = ConnectionState::Ready;
        parse_response(&reply, command)
    }

    /// Program frequency, tone and squelch.
    ///
    /// Missing parameters fall back to the saved settings (squelch to
    /// 4, offset to simplex); an explicit CTCSS tone overrides any
    /// saved DCS code and vice versa. On success the resolved values
    /// are committed and persisted; on failure the store is untouched.
    pub fn set_radio(&mut self, params: &RadioParams) -> Result<()> {
        let current = self.store.current().clone();

        let frequency = params
            .frequency
            .or(current.frequency)
            .ok_or(FrsError::MissingFrequency)?;
        let offset = params.offset.or(current.offset).unwrap_or(0.0);
        let squelch = params.squelch.or(current.squelch).unwrap_or(DEFAULT_SQUELCH);

        let (ctcss, dcs) = if params.ctcss.is_some() {
            (params.ctcss.clone(), None)
        } else if params.dcs.is_some() {
            (None, params.dcs.clone())
        } else if current.ctcss.is_some() {
            (current.ctcss.clone(), None)
        } else {
            (None, current.dcs.clone())
        };

        let tone = match (&ctcss, &dcs) {
            (Some(index), _) => {
                let index: u8 = index
                    .parse()
                    .map_err(|_| FrsError::UnknownCtcss(index.clone()))?;
                // "00" persisted via --ctcss none means no tone.
                if index == 0 { Tone::None } else { Tone::Ctcss(index) }
            }
            (None, Some(code)) => Tone::Dcs(code.clone()),
            (None, None) => Tone::None,
        };

        let rx_mhz = frequency;
        let tx_mhz = frequency + offset;

        let command = Command::SetGroup {
            bandwidth: Bandwidth::Wide,
            tx_mhz,
            rx_mhz,
            tone: tone.clone(),
            squelch,
        };
        match self.exchange(&command)? {
            Response::Ack => {}
            other => {
                warn!("unexpected reply to group set: {other:?}");
                return Err(FrsError::Protocol("unexpected group set reply".into()));
            }
        }

        self.store.merge(&RadioSettings {
            frequency: Some(frequency),
            offset: Some(offset),
            squelch: Some(squelch),
            ctcss,
            dcs,
            volume: None,
            filter: None,
        });
        self.store.persist();
        info!(
            "group set: rx {rx_mhz:.4} MHz, tx {tx_mhz:.4} MHz, tone {tone}, squelch {squelch}"
        );

        match params.close_tail {
            Some(close) if tone.is_ctcss() => self.set_close_tail(close)?,
            Some(_) => warn!("ignoring --close-tail specified without ctcss"),
            None => {}
        }
        Ok(())
    }

    /// Set the audio filters. Unspecified switches keep their saved
    /// state (disabled when never configured).
    pub fn set_filters(&mut self, params: &FilterParams) -> Result<()> {
        let saved = self.store.current().filter.unwrap_or_default();
        let filter = FilterSettings {
            emphasis: params.emphasis.unwrap_or(saved.emphasis),
            highpass: params.highpass.unwrap_or(saved.highpass),
            lowpass: params.lowpass.unwrap_or(saved.lowpass),
        };

        let command = Command::SetFilter {
            emphasis: filter.emphasis,
            highpass: filter.highpass,
            lowpass: filter.lowpass,
        };
        match self.exchange(&command)? {
            Response::Ack => {}
            other => {
                warn!("unexpected reply to filter set: {other:?}");
                return Err(FrsError::Protocol("unexpected filter set reply".into()));
            }
        }

        self.store.merge(&RadioSettings {
            filter: Some(filter),
            ..RadioSettings::default()
        });
        self.store.persist();
        let yn = |enabled| if enabled { "yes" } else { "no" };
        info!(
            "filters set: emphasis {}, high-pass {}, low-pass {}",
            yn(filter.emphasis),
            yn(filter.highpass),
            yn(filter.lowpass)
        );
        Ok(())
    }

    /// Set the volume level; `None` falls back to the saved level,
    /// then to 4.
    pub fn set_volume(&mut self, level: Option<u8>) -> Result<()> {
        let level = level
            .or(self.store.current().volume)
            .unwrap_or(DEFAULT_VOLUME);

        match self.exchange(&Command::SetVolume(level))? {
            Response::Ack => {}
            other => {
                warn!("unexpected reply to volume set: {other:?}");
                return Err(FrsError::Protocol("unexpected volume set reply".into()));
            }
        }

        self.store.merge(&RadioSettings {
            volume: Some(level),
            ..RadioSettings::default()
        });
        self.store.persist();
        info!("volume level set to {level}");
        Ok(())
    }

    /// Enable or disable closing of the CTCSS tail tone.
    pub fn set_close_tail(&mut self, close: bool) -> Result<()> {
        match self.exchange(&Command::SetTail(close))? {
            Response::Ack => {
                info!("close tail: {}", if close { "yes" } else { "no" });
                Ok(())
            }
            other => {
                warn!("unexpected reply to tail set: {other:?}");
                Err(FrsError::Protocol("unexpected tail set reply".into()))
            }
        }
    }

    /// Read the firmware version.
    pub fn version(&mut self) -> Result<String> {
        match self.exchange(&Command::VersionQuery)? {
            Response::Version(version) => {
                info!("firmware version: {version}");
                Ok(version)
            }
            other => {
                warn!("unexpected reply to version query: {other:?}");
                Err(FrsError::Protocol("unexpected version reply".into()))
            }
        }
    }

    /// Read the group settings programmed into the device.
    pub fn group(&mut self) -> Result<GroupReport> {
        match self.exchange(&Command::GroupQuery)? {
            Response::Group(report) => Ok(report),
            other => {
                warn!("unexpected reply to group query: {other:?}");
                Err(FrsError::Protocol("unexpected group query reply".into()))
            }
        }
    }

    /// Probe the device with [`PROBE_COMMANDS`] and report which are
    /// supported.
    ///
    /// A command counts as supported when any reply not containing
    /// `ERROR` arrives before the read timeout. Settings are never
    /// touched. Only a hard I/O failure aborts the walk.
    pub fn probe(&mut self) -> Result<Vec<(&'static str, bool)>> {
        let mut results = Vec::with_capacity(PROBE_COMMANDS.len());

        for &probe in PROBE_COMMANDS {
            info!("probing command: {probe}");
            self.state = ConnectionState::Busy;

            if let Err(e) = self.transport.send_line(probe) {
                error!("write failed, dropping connection: {e}");
                self.state = ConnectionState::Disconnected;
                return Err(FrsError::ConnectionLost);
            }

            let supported = match self.transport.read_line() {
                Ok(reply) if reply.contains("ERROR") => false,
                Ok(reply) => {
                    info!("command supported: {probe}, reply: {reply}");
                    true
                }
                Err(FrsError::Timeout) => false,
                Err(e) => {
                    error!("read failed, dropping connection: {e}");
                    self.state = ConnectionState::Disconnected;
                    return Err(FrsError::ConnectionLost);
                }
            };

            self.state = ConnectionState::Ready;
            results.push((probe, supported));
        }

        Ok(results)
    }
}
