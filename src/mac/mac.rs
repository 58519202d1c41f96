use std::fmt;
use std::str::FromStr;

use macaddr::MacAddr6;
use rand::Rng;

pub const HARDWARE_ADDR_LEN: usize = 6;

const MULTICAST_BIT: u8 = 0x01;
const LOCAL_BIT: u8 = 0x02;

/// A 6 byte ethernet hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HardwareAddress([u8; HARDWARE_ADDR_LEN]);

impl HardwareAddress {
    pub const fn new(bytes: [u8; HARDWARE_ADDR_LEN]) -> Self {
        Self(bytes)
    }

    pub fn octets(&self) -> [u8; HARDWARE_ADDR_LEN] {
        self.0
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & MULTICAST_BIT != 0
    }

    /// Locally administered, i.e. not assigned by a vendor.
    pub fn is_local(&self) -> bool {
        self.0[0] & LOCAL_BIT != 0
    }
}

impl From<[u8; HARDWARE_ADDR_LEN]> for HardwareAddress {
    fn from(bytes: [u8; HARDWARE_ADDR_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<MacAddr6> for HardwareAddress {
    fn from(mac: MacAddr6) -> Self {
        let mut bytes = [0u8; HARDWARE_ADDR_LEN];
        bytes.copy_from_slice(mac.as_bytes());
        Self(bytes)
    }
}

impl From<HardwareAddress> for MacAddr6 {
    fn from(addr: HardwareAddress) -> Self {
        MacAddr6::from(addr.0)
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for HardwareAddress {
    type Err = macaddr::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<MacAddr6>().map(HardwareAddress::from)
    }
}

/// Draws a random unicast, locally administered address from `rng`.
pub fn new_hardware_addr<R: Rng + ?Sized>(rng: &mut R) -> HardwareAddress {
    let mut hardware_addr = [0u8; HARDWARE_ADDR_LEN];
    rng.fill(&mut hardware_addr);
    hardware_addr[0] = (hardware_addr[0] & !MULTICAST_BIT) | LOCAL_BIT;
    HardwareAddress(hardware_addr)
}
