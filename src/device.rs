use heapless::String;

/// Size of the response buffer the bring-up sequences hand to `receive`.
pub const WIFI_RX_BUFFER_SIZE: usize = 256;
/// Upper bound on one outbound command, padding byte included.
pub const WIFI_TX_BUFFER_SIZE: usize = 128;

pub const SSID_MAX: usize = 32;
pub const PASSPHRASE_MAX: usize = 32;
pub(crate) const IP_ADDR_MAX: usize = 16;

/// Filler byte the module appends to odd-length responses (NAK).
pub(crate) const RX_PADDING: u8 = 0x15;
/// Filler byte this driver appends to odd-length commands.
pub(crate) const TX_PADDING: u8 = b'\n';

/// Prompt the module prints once it has booted. `init` requires an exact
/// match before any command goes out.
pub(crate) const POWERUP_BANNER: &[u8] = b"\r\n> ";

/// Ready-line poll bound. One miss costs `READY_POLL_INTERVAL_US`, so the
/// budget works out to roughly a second before `ReadyTimeout`.
pub(crate) const READY_POLL_BUDGET: u32 = 100_000;
pub(crate) const READY_POLL_INTERVAL_US: u32 = 10;

pub(crate) const RESET_PULSE_MS: u32 = 10;
pub(crate) const RESET_SETTLE_MS: u32 = 500;

/// Soft-AP security mode, encoded as the value the `A1=` command takes.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecurityType {
    Open = 0,
    Wep = 1,
    WpaPsk = 2,
    Wpa2Psk = 3,
    WpaWpa2Psk = 4,
}

/// Server transport, encoded as the value the `P1=` command takes.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportProtocol {
    Tcp = 0,
    Udp = 1,
}

/// Provisioning parameters for `create_network` and `web_server_init`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    pub security: SecurityType,
    pub passphrase: String<PASSPHRASE_MAX>,
    pub ssid: String<SSID_MAX>,
    pub protocol: TransportProtocol,
    pub port: u16,
}

/// Fault raised by any exchange step. `E` is the SPI bus error type.
///
/// Nothing here is retried or recovered internally: the first fault stops
/// the exchange and surfaces to the caller, who owns the retry policy.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum WifiError<E> {
    /// The SPI transfer itself failed.
    Spi(E),
    /// A chip-select, reset or ready pin operation failed.
    Pin,
    /// The ready line never reached the expected level within the poll
    /// budget.
    ReadyTimeout,
    /// The module kept the ready line asserted after the response buffer
    /// had taken `capacity - 2` bytes.
    BufferOverflow,
    /// The ready line was still asserted after a completed receive: the
    /// response did not fit the caller's buffer.
    ResponseOverflow,
    /// A received buffer carried no NUL terminator within its capacity.
    UnterminatedResponse,
    /// The power-up banner did not match the expected literal.
    PowerUpMismatch,
    /// The `A?` status response had no address between the first two
    /// commas, or the address did not fit the handle's field.
    MalformedStatus,
    /// The declared command size exceeds `WIFI_TX_BUFFER_SIZE`.
    CommandTooLong,
}

/// Handle for one es-WiFi module.
///
/// Owns the bus and the three control pins exclusively; exchanges are
/// strictly serialized through `&mut self`.
pub struct EsWifi<SPI, CS, RDY, RST, D> {
    pub(crate) spi: SPI,
    pub(crate) cs: CS,
    pub(crate) ready: RDY,
    pub(crate) reset: RST,
    pub(crate) delay: D,
    pub(crate) config: NetworkConfig,
    pub(crate) ip_address: Option<String<IP_ADDR_MAX>>,
}

impl<SPI, CS, RDY, RST, D> EsWifi<SPI, CS, RDY, RST, D> {
    pub fn new(spi: SPI, cs: CS, ready: RDY, reset: RST, delay: D, config: NetworkConfig) -> Self {
        Self {
            spi,
            cs,
            ready,
            reset,
            delay,
            config,
            ip_address: None,
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Address the module reported during `create_network`, if any.
    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    /// Gives the bus, pins and delay back to the caller.
    pub fn release(self) -> (SPI, CS, RDY, RST, D) {
        (self.spi, self.cs, self.ready, self.reset, self.delay)
    }
}
