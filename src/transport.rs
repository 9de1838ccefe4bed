use std::io::{Read, Write};
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use crate::error::{FrsError, Result};

/// Serial framing for the module: 9600 baud, 8 data bits, no parity,
/// one stop bit.
pub const BAUD_RATE: u32 = 9600;
const DATA_BITS: serialport::DataBits = serialport::DataBits::Eight;
const STOP_BITS: serialport::StopBits = serialport::StopBits::One;
const PARITY: serialport::Parity = serialport::Parity::None;

/// How long to wait for a reply line before giving up.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Every frame is terminated by CR + LF.
pub const EOL: &str = "\r\n";

/// Ports to try when none is given explicitly.
pub const DEFAULT_PORTS: &[&str] = &[
    "/dev/serial0",
    "/dev/ttyUSB0",
    "COM1",
    "COM2",
    "COM3",
    "COM4",
];

/// A line-oriented transport to the module.
///
/// Implementors are synchronous and blocking: `read_line` waits up to
/// the configured read timeout for a complete line and returns
/// [`FrsError::Timeout`] if none arrives, so callers can tell "no
/// data" apart from a malformed reply.
pub trait Transport {
    /// Write one frame, appending the CRLF terminator.
    fn send_line(&mut self, line: &str) -> Result<()>;

    /// Read one frame, stripped of trailing whitespace and terminator.
    fn read_line(&mut self) -> Result<String>;
}

/// A transport backed by a native serial port.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
    /// Carries bytes read past the last terminator into the next call.
    buf: Vec<u8>,
}

impl SerialTransport {
    pub fn new(port: Box<dyn serialport::SerialPort>) -> Self {
        Self {
            port,
            buf: Vec::with_capacity(128),
        }
    }

    /// Read more bytes from the port into the internal buffer.
    fn fill_buf(&mut self, deadline: Instant) -> Result<()> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(FrsError::Timeout);
        }

        let _ = self.port.set_timeout(remaining.min(Duration::from_millis(100)));

        let mut tmp = [0u8; 64];
        match self.port.read(&mut tmp) {
            Ok(n) => {
                trace!("read {} bytes: {:02X?}", n, &tmp[..n]);
                self.buf.extend_from_slice(&tmp[..n]);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(()),
            Err(e) => Err(FrsError::Io(e)),
        }
    }
}

impl Transport for SerialTransport {
    fn send_line(&mut self, line: &str) -> Result<()> {
        debug!("TX: {line}");
        self.port.write_all(line.as_bytes())?;
        self.port.write_all(EOL.as_bytes())?;
        self.port.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        let deadline = Instant::now() + READ_TIMEOUT;

        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = self.buf.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&raw).trim_end().to_string();
                debug!("RX: {line}");
                return Ok(line);
            }

            if Instant::now() >= deadline {
                return Err(FrsError::Timeout);
            }

            self.fill_buf(deadline)?;
        }
    }
}

/// Open a serial port with the module's framing (9600 8N1).
pub fn open_port(port_name: &str) -> Result<SerialTransport> {
    let port = serialport::new(port_name, BAUD_RATE)
        .data_bits(DATA_BITS)
        .stop_bits(STOP_BITS)
        .parity(PARITY)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(FrsError::Serial)?;

    info!("opened {} at {} baud", port_name, BAUD_RATE);
    Ok(SerialTransport::new(port))
}

/// Find and open the module's serial port.
///
/// With an explicit port only that one is attempted; otherwise each
/// entry of [`DEFAULT_PORTS`] is tried in order and the first that
/// opens wins. A failed attempt holds no handle, so nothing leaks.
pub fn locate_port(explicit: Option<&str>) -> Result<SerialTransport> {
    let candidates: Vec<&str> = match explicit {
        Some(port) => vec![port],
        None => DEFAULT_PORTS.to_vec(),
    };

    for name in &candidates {
        match open_port(name) {
            Ok(transport) => return Ok(transport),
            Err(e) => debug!("failed to open port {name}: {e}"),
        }
    }

    warn!("no usable serial port among {} candidate(s)", candidates.len());
    Err(FrsError::NoPortFound(candidates.join(", ")))
}
