use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;
use heapless::String;

use crate::device::{
    EsWifi, WifiError, IP_ADDR_MAX, POWERUP_BANNER, RESET_PULSE_MS, RESET_SETTLE_MS,
    WIFI_RX_BUFFER_SIZE, WIFI_TX_BUFFER_SIZE,
};
use crate::fmt::debug;

impl<SPI, CS, RDY, RST, D> EsWifi<SPI, CS, RDY, RST, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RDY: InputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// Resets the module and verifies the power-up banner.
    ///
    /// A banner other than the exact `"\r\n> "` prompt is
    /// `PowerUpMismatch`; no command goes out in that case.
    pub fn init(&mut self) -> Result<(), WifiError<SPI::Error>> {
        self.reset_module()?;
        self.select()?;
        self.wait_ready()?;

        let mut banner = [0u8; WIFI_RX_BUFFER_SIZE];
        let checked = match self.receive(&mut banner) {
            Ok(len) if &banner[..len] == POWERUP_BANNER => Ok(()),
            Ok(_) => Err(WifiError::PowerUpMismatch),
            Err(err) => Err(err),
        };
        self.deselect()?;
        checked?;

        debug!("eswifi: module powered up");
        Ok(())
    }

    /// Brings up the soft access point: security mode, passphrase, SSID,
    /// direct mode, then a status query whose reported address is stored
    /// in the handle.
    pub fn create_network(&mut self) -> Result<(), WifiError<SPI::Error>> {
        let mut resp = [0u8; WIFI_RX_BUFFER_SIZE];
        let mut cmd: String<WIFI_TX_BUFFER_SIZE> = String::new();

        write!(cmd, "A1={}\r", self.config.security as u8)
            .map_err(|_| WifiError::CommandTooLong)?;
        self.send_formatted(&cmd, &mut resp)?;

        cmd.clear();
        write!(cmd, "A2={}\r", self.config.passphrase).map_err(|_| WifiError::CommandTooLong)?;
        self.send_formatted(&cmd, &mut resp)?;

        cmd.clear();
        write!(cmd, "AS=0,{}\r", self.config.ssid).map_err(|_| WifiError::CommandTooLong)?;
        self.send_formatted(&cmd, &mut resp)?;

        cmd.clear();
        write!(cmd, "AD\r").map_err(|_| WifiError::CommandTooLong)?;
        self.send_formatted(&cmd, &mut resp)?;

        cmd.clear();
        write!(cmd, "A?\r").map_err(|_| WifiError::CommandTooLong)?;
        let len = self.send_formatted(&cmd, &mut resp)?;

        let address = parse_status_address(&resp[..len]).ok_or(WifiError::MalformedStatus)?;
        let mut ip: String<IP_ADDR_MAX> = String::new();
        ip.push_str(address).map_err(|_| WifiError::MalformedStatus)?;
        debug!("eswifi: access point up, address {}", address);
        self.ip_address = Some(ip);
        Ok(())
    }

    /// Opens the listening socket: socket select, transport protocol,
    /// port, in that order.
    pub fn web_server_init(&mut self) -> Result<(), WifiError<SPI::Error>> {
        let mut resp = [0u8; WIFI_RX_BUFFER_SIZE];
        let mut cmd: String<WIFI_TX_BUFFER_SIZE> = String::new();

        write!(cmd, "P0=0\r").map_err(|_| WifiError::CommandTooLong)?;
        self.send_formatted(&cmd, &mut resp)?;

        cmd.clear();
        write!(cmd, "P1={}\r", self.config.protocol as u8).map_err(|_| WifiError::CommandTooLong)?;
        self.send_formatted(&cmd, &mut resp)?;

        cmd.clear();
        write!(cmd, "P2={}\r", self.config.port).map_err(|_| WifiError::CommandTooLong)?;
        self.send_formatted(&cmd, &mut resp)?;

        debug!("eswifi: server socket listening on port {}", self.config.port);
        Ok(())
    }

    /// Declared size is the formatted length plus the terminator, the
    /// `sizeof()`-style contract `transmit` pads on.
    fn send_formatted(
        &mut self,
        cmd: &str,
        resp: &mut [u8],
    ) -> Result<usize, WifiError<SPI::Error>> {
        self.send_command(cmd.as_bytes(), cmd.len() + 1, resp)
    }

    fn reset_module(&mut self) -> Result<(), WifiError<SPI::Error>> {
        self.reset.set_low().map_err(|_| WifiError::Pin)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        self.reset.set_high().map_err(|_| WifiError::Pin)?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        Ok(())
    }
}

/// The status response lists comma-separated fields; the assigned address
/// sits between the first and second comma.
fn parse_status_address(resp: &[u8]) -> Option<&str> {
    let first = resp.iter().position(|&b| b == b',')?;
    let rest = &resp[first + 1..];
    let second = rest.iter().position(|&b| b == b',')?;
    core::str::from_utf8(&rest[..second]).ok()
}
