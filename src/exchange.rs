use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;
use heapless::Vec;

use crate::device::{
    EsWifi, WifiError, READY_POLL_BUDGET, READY_POLL_INTERVAL_US, RX_PADDING, TX_PADDING,
    WIFI_TX_BUFFER_SIZE,
};
use crate::fmt::trace;
use crate::trim::trim_in_place;

impl<SPI, CS, RDY, RST, D> EsWifi<SPI, CS, RDY, RST, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RDY: InputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// Runs one full command/response transaction: wait for the module to
    /// accept a command, transmit it, wait for the response, receive it.
    ///
    /// The ready line still being asserted after the receive means the
    /// module had more response queued than `resp` could take; that is
    /// reported as `ResponseOverflow`. Chip select is released on every
    /// exit path and no step is ever retried here.
    pub fn send_command(
        &mut self,
        cmd: &[u8],
        declared_size: usize,
        resp: &mut [u8],
    ) -> Result<usize, WifiError<SPI::Error>> {
        self.wait_ready()?;
        self.select()?;
        let sent = self.transmit(cmd, declared_size);
        self.deselect()?;
        sent?;

        self.wait_ready()?;
        self.select()?;
        let received = match self.receive(resp) {
            Ok(len) => match self.ready_asserted() {
                Ok(true) => Err(WifiError::ResponseOverflow),
                Ok(false) => Ok(len),
                Err(err) => Err(err),
            },
            Err(err) => Err(err),
        };
        self.deselect()?;
        received
    }

    /// Reads response units into `buf` while the ready line stays
    /// asserted, then strips the RX padding from both ends.
    ///
    /// At most `buf.len() - 2` bytes are accepted so a terminator slot
    /// always survives; a unit arriving beyond that is `BufferOverflow`.
    /// On success `buf` holds a NUL-terminated string with no padding
    /// bytes and the logical length is returned.
    pub fn receive(&mut self, buf: &mut [u8]) -> Result<usize, WifiError<SPI::Error>> {
        buf.fill(0);
        let cap = buf.len();
        let mut cnt = 0;

        while self.ready_asserted()? {
            if cnt + 2 >= cap {
                return Err(WifiError::BufferOverflow);
            }
            let unit = self.transfer_unit([TX_PADDING, TX_PADDING])?;
            buf[cnt] = unit[0];
            buf[cnt + 1] = unit[1];
            cnt += 2;
        }
        trace!("eswifi: received {} raw bytes", cnt);

        trim_in_place(buf, RX_PADDING).ok_or(WifiError::UnterminatedResponse)
    }

    /// Transmits a command as `declared_size / 2` units.
    ///
    /// `declared_size` counts the terminator, mirroring a `sizeof()`-style
    /// caller contract, and the padding decision is made on it rather than
    /// on the live byte count: an even declared size gets exactly one
    /// padding byte appended, an odd one gets none. Callers declaring a
    /// size that disagrees with the actual command length get the declared
    /// behavior, not a corrected one.
    pub fn transmit(
        &mut self,
        cmd: &[u8],
        declared_size: usize,
    ) -> Result<(), WifiError<SPI::Error>> {
        if declared_size > WIFI_TX_BUFFER_SIZE {
            return Err(WifiError::CommandTooLong);
        }

        let unit_bytes = (declared_size / 2) * 2;
        let content = declared_size.saturating_sub(1).min(cmd.len());

        let mut frame: Vec<u8, WIFI_TX_BUFFER_SIZE> = Vec::new();
        frame
            .extend_from_slice(&cmd[..content])
            .map_err(|_| WifiError::CommandTooLong)?;
        if declared_size % 2 == 0 {
            frame.push(TX_PADDING).map_err(|_| WifiError::CommandTooLong)?;
        }
        // Overstated declared sizes are filled with NUL up to the unit
        // boundary, never with uninitialized bytes.
        while frame.len() < unit_bytes {
            frame.push(0).map_err(|_| WifiError::CommandTooLong)?;
        }

        for pair in frame[..unit_bytes].chunks_exact(2) {
            self.transfer_unit([pair[0], pair[1]])?;
        }
        trace!("eswifi: sent {} units", unit_bytes / 2);
        Ok(())
    }

    /// Polls the ready line until it asserts, backing off between misses.
    /// Exhausting the budget is `ReadyTimeout` instead of hanging forever.
    pub(crate) fn wait_ready(&mut self) -> Result<(), WifiError<SPI::Error>> {
        for _ in 0..READY_POLL_BUDGET {
            if self.ready_asserted()? {
                return Ok(());
            }
            self.delay.delay_us(READY_POLL_INTERVAL_US);
        }
        Err(WifiError::ReadyTimeout)
    }

    pub(crate) fn ready_asserted(&mut self) -> Result<bool, WifiError<SPI::Error>> {
        self.ready.is_high().map_err(|_| WifiError::Pin)
    }

    /// One atomic 2-byte transfer, the transport's native unit.
    fn transfer_unit(&mut self, mut unit: [u8; 2]) -> Result<[u8; 2], WifiError<SPI::Error>> {
        self.spi
            .transfer_in_place(&mut unit)
            .map_err(WifiError::Spi)?;
        Ok(unit)
    }

    pub(crate) fn select(&mut self) -> Result<(), WifiError<SPI::Error>> {
        self.cs.set_low().map_err(|_| WifiError::Pin)
    }

    pub(crate) fn deselect(&mut self) -> Result<(), WifiError<SPI::Error>> {
        self.cs.set_high().map_err(|_| WifiError::Pin)
    }
}
