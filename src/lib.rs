//! Driver for the Inventek es-WiFi module behind a half-duplex SPI link.
//!
//! The module talks an AT-style text protocol. Every exchange is one
//! command followed by one response, moved in 16-bit units and gated by the
//! CMD/DATA-READY line: the module raises it when it can accept a command
//! or has response bytes queued. Odd-length payloads are padded to a full
//! unit with a filler byte on each side of the link; the driver adds the
//! TX filler and strips the RX filler so callers only ever see clean text.
//!
//! The driver is blocking and generic over the `embedded-hal` 1.0 traits,
//! so it runs on any HAL that provides an `SpiBus`, two output pins
//! (chip select, reset), an input pin (ready) and a `DelayNs`.

#![cfg_attr(not(test), no_std)]

mod device;
mod exchange;
mod fmt;
mod network;
mod trim;


pub use device::{
    EsWifi, NetworkConfig, SecurityType, TransportProtocol, WifiError, PASSPHRASE_MAX, SSID_MAX,
    WIFI_RX_BUFFER_SIZE, WIFI_TX_BUFFER_SIZE,
};
