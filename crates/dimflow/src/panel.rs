//! Serial link to the dimming panel
//!
//! Owns the physical conversation with the QSE network interface. The link
//! is split in two halves over cloned port handles: a reader that turns
//! line-delimited responses into [`PanelEvent`]s on a channel, and a writer
//! implementing [`CommandSink`] for the dispatcher.
//!
//! The interface is fragile: overlapping writes are known to crash it, so
//! only the dispatcher thread writes commands (the reader's reset command
//! goes out on its own cloned handle and only in the error path, when the
//! interface is not processing commands anyway).

use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

use dimflow_core::codec::{self, PanelEvent};
use serialport::SerialPort;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, trace, warn};

use crate::config::SerialConfig;
use crate::error::{BridgeError, Result};

/// Read timeout on the serial port. Bounds how long the reader thread can
/// block, which is also its shutdown-check interval.
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Sink for encoded panel commands. The dispatcher is generic over this so
/// tests can record commands instead of needing a serial port.
pub trait CommandSink: Send {
    /// Write one already-terminated command line, blocking until flushed.
    fn send_line(&mut self, line: &str) -> Result<()>;
}

/// Write half of the panel link.
pub struct PanelWriter {
    port: Box<dyn SerialPort>,
}

impl CommandSink for PanelWriter {
    fn send_line(&mut self, line: &str) -> Result<()> {
        self.port
            .write_all(line.as_bytes())
            .map_err(BridgeError::SerialWrite)?;
        self.port.flush().map_err(BridgeError::SerialWrite)?;
        Ok(())
    }
}

/// Read half of the panel link.
pub struct PanelReader {
    port: Box<dyn SerialPort>,
    resetter: Box<dyn SerialPort>,
}

/// Open the serial port and split it into reader and writer halves.
///
/// Failure here is fatal to the daemon; there is nothing to bridge without
/// the panel.
pub fn open_panel(cfg: &SerialConfig) -> Result<(PanelReader, PanelWriter)> {
    let open_err = |source| BridgeError::SerialOpen {
        path: cfg.device.clone(),
        source,
    };

    let port = serialport::new(&cfg.device, cfg.baud)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(open_err)?;
    let reader_port = port.try_clone().map_err(open_err)?;
    let resetter = port.try_clone().map_err(open_err)?;

    info!("panel link open on {} at {} baud", cfg.device, cfg.baud);

    Ok((
        PanelReader {
            port: reader_port,
            resetter,
        },
        PanelWriter { port },
    ))
}

impl PanelReader {
    /// Blocking read loop; runs on its own thread until shutdown or the
    /// port goes away. Decoded events are forwarded on `events`; error
    /// code 6 (interface wants a reboot) is healed here by sending the
    /// reset command before the event is forwarded.
    pub fn run(self, events: mpsc::Sender<PanelEvent>, shutdown: watch::Receiver<bool>) {
        let Self { port, mut resetter } = self;
        let mut reader = BufReader::new(port);
        let mut line = String::new();

        while !*shutdown.borrow() {
            match reader.read_line(&mut line) {
                Ok(0) => {
                    error!("panel serial port closed");
                    break;
                }
                Ok(_) => {
                    trace!(raw = %line.trim_end(), "panel line");
                    let event = codec::decode_line(&line);
                    line.clear();

                    if event == PanelEvent::Empty {
                        continue;
                    }
                    if event == PanelEvent::ErrorCode(codec::ERROR_FIRMWARE_FAULT) {
                        warn!("panel interface reported error 6, sending reset");
                        if let Err(e) = resetter
                            .write_all(codec::reset_command().as_bytes())
                            .and_then(|_| resetter.flush())
                        {
                            warn!("failed to send reset command: {e}");
                        }
                    }
                    if events.blocking_send(event).is_err() {
                        debug!("panel event channel closed, stopping reader");
                        break;
                    }
                }
                // Timeouts are just the poll cadence; a partial line stays
                // buffered in `line` for the next read.
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    warn!("dropping non-UTF-8 panel line: {e}");
                    line.clear();
                }
                Err(e) => {
                    error!("panel serial read failed: {e}");
                    break;
                }
            }
        }
        info!("panel reader stopped");
    }
}
