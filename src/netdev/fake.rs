//! In-memory network devices for exercising [`NetControl`] users without privileges.
use std::collections::HashMap;

use nix::errno::Errno;

use crate::mac::HardwareAddress;
use crate::netdev::{InterfaceFlags, InterfaceName, NetControl};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open,
    QueryFlags(String),
    SetFlags(String, InterfaceFlags),
    SetHardwareAddress(String, HardwareAddress),
    Close,
}

/// A step that can be told to fail.
///
/// `Down` and `Restore` are the first and second `set_flags` after an `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    Open,
    Query,
    Down,
    SetAddress,
    Restore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeDevice {
    pub flags: InterfaceFlags,
    pub address: HardwareAddress,
}

#[derive(Debug)]
pub struct FakeChannel(u32);

#[derive(Debug, Default)]
pub struct FakeControl {
    pub devices: HashMap<String, FakeDevice>,
    pub calls: Vec<Call>,
    faults: HashMap<Fault, Errno>,
    set_flags_count: usize,
    next_channel: u32,
}

impl FakeControl {
    pub fn with_device(
        mut self,
        name: &str,
        flags: InterfaceFlags,
        address: HardwareAddress,
    ) -> Self {
        let device = FakeDevice { flags, address };
        self.devices.insert(name.to_string(), device);
        self
    }

    pub fn fail(mut self, fault: Fault, errno: Errno) -> Self {
        self.faults.insert(fault, errno);
        self
    }

    pub fn device(&self, name: &str) -> FakeDevice {
        self.devices[name]
    }

    pub fn count(&self, call: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| call(c)).count()
    }

    fn check(&self, fault: Fault) -> nix::Result<()> {
        match self.faults.get(&fault) {
            Some(errno) => Err(*errno),
            None => Ok(()),
        }
    }

    fn lookup(&mut self, name: &InterfaceName) -> nix::Result<&mut FakeDevice> {
        self.devices.get_mut(&name.to_string()).ok_or(Errno::ENODEV)
    }
}

impl NetControl for FakeControl {
    type Channel = FakeChannel;

    fn open(&mut self) -> nix::Result<FakeChannel> {
        self.calls.push(Call::Open);
        self.check(Fault::Open)?;
        self.set_flags_count = 0;
        self.next_channel += 1;
        Ok(FakeChannel(self.next_channel))
    }

    fn query_flags(
        &mut self,
        channel: &FakeChannel,
        name: &InterfaceName,
    ) -> nix::Result<InterfaceFlags> {
        assert_eq!(channel.0, self.next_channel, "stale channel");
        self.calls.push(Call::QueryFlags(name.to_string()));
        self.check(Fault::Query)?;
        Ok(self.lookup(name)?.flags)
    }

    fn set_flags(
        &mut self,
        channel: &FakeChannel,
        name: &InterfaceName,
        flags: InterfaceFlags,
    ) -> nix::Result<()> {
        assert_eq!(channel.0, self.next_channel, "stale channel");
        self.calls.push(Call::SetFlags(name.to_string(), flags));
        self.set_flags_count += 1;
        match self.set_flags_count {
            1 => self.check(Fault::Down)?,
            _ => self.check(Fault::Restore)?,
        }
        self.lookup(name)?.flags = flags;
        Ok(())
    }

    fn set_hardware_address(
        &mut self,
        channel: &FakeChannel,
        name: &InterfaceName,
        address: HardwareAddress,
    ) -> nix::Result<()> {
        assert_eq!(channel.0, self.next_channel, "stale channel");
        self.calls
            .push(Call::SetHardwareAddress(name.to_string(), address));
        self.check(Fault::SetAddress)?;
        self.lookup(name)?.address = address;
        Ok(())
    }

    fn close(&mut self, channel: FakeChannel) {
        assert_eq!(channel.0, self.next_channel, "stale channel");
        self.calls.push(Call::Close);
    }
}
