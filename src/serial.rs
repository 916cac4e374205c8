use std::io::Read;
use std::io::Write;

pub struct SerialLink {
    name: String,
    port: Box<dyn serialport::SerialPort>,
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl SerialLink {
    pub fn open(
        path: &str,
        baud_rate: u32,
        timeout: std::time::Duration,
    ) -> Result<Self, LinkError> {
        tracing::debug!(?path, ?baud_rate, "Opening serial port");
        let port = serialport::new(path, baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|source| LinkError::Open {
                path: path.to_string(),
                source,
            })?;

        tracing::info!(?path, ?baud_rate, "Serial port opened");
        Ok(Self {
            name: path.to_string(),
            port,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.port.write_all(bytes).map_err(LinkError::Write)?;
        tracing::trace!(sent = %String::from_utf8_lossy(bytes), "send");
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), LinkError> {
        self.port.flush().map_err(LinkError::Flush)
    }

    /// Pulse DTR, which the display wires to its reset pin.
    ///
    /// The device needs a while to boot afterwards before it accepts frames.
    pub async fn reset(&mut self, hold: std::time::Duration) -> Result<(), LinkError> {
        tracing::info!(port = %self.name, ?hold, "Resetting device");
        let port = &mut self.port;
        pulse_dtr(
            |level| port.write_data_terminal_ready(level).map_err(LinkError::Dtr),
            hold,
        )
        .await
    }

    pub fn pending_input(&self) -> Result<u32, LinkError> {
        self.port.bytes_to_read().map_err(LinkError::PendingInput)
    }

    pub fn has_pending_input(&self) -> Result<bool, LinkError> {
        self.pending_input().map(|pending| pending > 0)
    }

    /// Read whatever the device has sent so far without blocking.
    pub fn read_pending(&mut self) -> Result<Vec<u8>, LinkError> {
        if !self.has_pending_input()? {
            return Ok(Vec::new());
        }

        let pending = self.pending_input()?;
        let mut received = vec![0; pending as usize];
        let read = self.port.read(&mut received).map_err(LinkError::Read)?;
        received.truncate(read);

        if !received.is_empty() {
            tracing::debug!(received = %String::from_utf8_lossy(&received).trim(), "recv");
        }

        Ok(received)
    }
}

/// Raise DTR, hold it, drop it again.
async fn pulse_dtr<E>(
    mut set_dtr: impl FnMut(bool) -> Result<(), E>,
    hold: std::time::Duration,
) -> Result<(), E> {
    set_dtr(true)?;
    tokio::time::sleep(hold).await;
    set_dtr(false)
}

impl crate::protocol::FrameSink for SerialLink {
    type Error = LinkError;

    fn send(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.write(bytes)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        SerialLink::flush(self)
    }

    fn drain_input(&mut self) -> Result<Vec<u8>, Self::Error> {
        self.read_pending()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Failed to open serial port '{}'", .path)]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Failed to write to serial port")]
    Write(#[source] std::io::Error),

    #[error("Failed to flush serial port")]
    Flush(#[source] std::io::Error),

    #[error("Failed to toggle DTR")]
    Dtr(#[source] serialport::Error),

    #[error("Failed to query pending input")]
    PendingInput(#[source] serialport::Error),

    #[error("Failed to read from serial port")]
    Read(#[source] std::io::Error),
}
