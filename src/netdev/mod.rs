//! Access to the kernel's network device configuration interface.
//!
//! Everything the reconfiguration logic needs from the OS goes through [`NetControl`],
//! so that it can be driven against an in-memory device in tests.
use std::fmt;
use std::ops::BitOr;

use nix::libc::{c_char, c_short, IFF_RUNNING, IFF_UP, IFNAMSIZ};

use crate::mac::HardwareAddress;

#[cfg(test)]
pub mod fake;
#[cfg(target_os = "linux")]
mod ioctl;

#[cfg(target_os = "linux")]
pub use ioctl::IoctlControl;

/// Snapshot of an interface's `ifr_flags`.
///
/// Bits without a named constant are carried through untouched.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InterfaceFlags(c_short);

impl InterfaceFlags {
    pub const UP: InterfaceFlags = InterfaceFlags(IFF_UP as c_short);
    pub const RUNNING: InterfaceFlags = InterfaceFlags(IFF_RUNNING as c_short);

    pub const fn from_bits(bits: c_short) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> c_short {
        self.0
    }

    pub fn contains(&self, other: InterfaceFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn without(&self, other: InterfaceFlags) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for InterfaceFlags {
    type Output = InterfaceFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for InterfaceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterfaceFlags({:#06x})", self.0 as u16)
    }
}

/// An interface name laid out the way `ifr_name` expects it.
///
/// Names are cut at the first NUL or after `IFNAMSIZ - 1` bytes, the rest is zeroed.
/// The cut counts bytes, so a non-ASCII name may lose the tail of a character; `Display`
/// then shows U+FFFD in its place.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InterfaceName([c_char; IFNAMSIZ]);

impl InterfaceName {
    pub fn new(name: &str) -> Self {
        let mut buf = [0 as c_char; IFNAMSIZ];
        for (dst, src) in buf[..IFNAMSIZ - 1]
            .iter_mut()
            .zip(name.bytes().take_while(|b| *b != 0))
        {
            *dst = src as c_char;
        }
        Self(buf)
    }

    pub fn as_raw(&self) -> &[c_char; IFNAMSIZ] {
        &self.0
    }

    fn as_bytes(&self) -> Vec<u8> {
        self.0
            .iter()
            .take_while(|c| **c != 0)
            .map(|c| *c as u8)
            .collect()
    }
}

impl fmt::Display for InterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.as_bytes()))
    }
}

impl fmt::Debug for InterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterfaceName({:?})", self.to_string())
    }
}

/// The control channel used to reconfigure a network device.
///
/// Every call blocks until the kernel answers. A channel returned by `open` must be
/// handed back to `close` exactly once.
pub trait NetControl {
    type Channel;

    fn open(&mut self) -> nix::Result<Self::Channel>;

    fn query_flags(
        &mut self,
        channel: &Self::Channel,
        name: &InterfaceName,
    ) -> nix::Result<InterfaceFlags>;

    fn set_flags(
        &mut self,
        channel: &Self::Channel,
        name: &InterfaceName,
        flags: InterfaceFlags,
    ) -> nix::Result<()>;

    fn set_hardware_address(
        &mut self,
        channel: &Self::Channel,
        name: &InterfaceName,
        address: HardwareAddress,
    ) -> nix::Result<()>;

    fn close(&mut self, channel: Self::Channel);
}

impl<T: NetControl + ?Sized> NetControl for &mut T {
    type Channel = T::Channel;

    fn open(&mut self) -> nix::Result<Self::Channel> {
        (**self).open()
    }

    fn query_flags(
        &mut self,
        channel: &Self::Channel,
        name: &InterfaceName,
    ) -> nix::Result<InterfaceFlags> {
        (**self).query_flags(channel, name)
    }

    fn set_flags(
        &mut self,
        channel: &Self::Channel,
        name: &InterfaceName,
        flags: InterfaceFlags,
    ) -> nix::Result<()> {
        (**self).set_flags(channel, name, flags)
    }

    fn set_hardware_address(
        &mut self,
        channel: &Self::Channel,
        name: &InterfaceName,
        address: HardwareAddress,
    ) -> nix::Result<()> {
        (**self).set_hardware_address(channel, name, address)
    }

    fn close(&mut self, channel: Self::Channel) {
        (**self).close(channel)
    }
}
