//! Serial transmit abstraction
//!
//! The command engine writes echoes, report sentences, and prompts
//! through this trait. The firmware backs it with a buffered UART; host
//! tests back it with a byte vector.

/// Serial transmitter for command responses
pub trait SerialTx {
    /// Error type for transmit operations
    type Error;

    /// Write all bytes, blocking until queued for transmission
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data out the wire
    fn flush(&mut self) -> Result<(), Self::Error>;
}
