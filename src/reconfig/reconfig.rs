use log::{debug, info, warn};
use nix::errno::Errno;
use thiserror::Error;

use crate::mac::HardwareAddress;
use crate::netdev::{InterfaceFlags, InterfaceName, NetControl};

/// Where a reconfiguration stopped.
///
/// `Idle -> Down -> AddressSet -> Up` is the successful path. The last three variants are
/// the failure edges taken after the interface was already brought down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    Down,
    AddressSet,
    Up,
    /// Address change rejected, original flags restored.
    RolledBack,
    /// Address change rejected and the flags could not be restored either.
    DegradedDown,
    /// New address applied but the original flags could not be restored.
    DegradedAddressOnly,
}

/// What the caller can assume about the interface after a failed [`Reconfigurator::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceState {
    /// Nothing was changed.
    Untouched,
    /// Old address kept. The flags were restored on a best-effort basis.
    OldAddress,
    /// New address applied, interface left administratively down.
    NewAddressDown,
}

#[derive(Debug, Error)]
pub enum ReconfigError {
    #[error("failed to open network control socket")]
    ChannelOpenFailed(#[source] Errno),
    #[error("failed to query flags of {name}")]
    QueryFailed { name: String, source: Errno },
    #[error("failed to bring {name} down")]
    DownFailed { name: String, source: Errno },
    #[error("failed to set hardware address of {name}")]
    AddressSetFailed { name: String, source: Errno },
    #[error("hardware address of {name} changed, but bringing it back up failed")]
    UpFailed { name: String, source: Errno },
}

impl ReconfigError {
    pub fn interface_state(&self) -> InterfaceState {
        match self {
            ReconfigError::ChannelOpenFailed(_)
            | ReconfigError::QueryFailed { .. }
            | ReconfigError::DownFailed { .. } => InterfaceState::Untouched,
            ReconfigError::AddressSetFailed { .. } => InterfaceState::OldAddress,
            ReconfigError::UpFailed { .. } => InterfaceState::NewAddressDown,
        }
    }

    pub fn errno(&self) -> Errno {
        match self {
            ReconfigError::ChannelOpenFailed(source)
            | ReconfigError::QueryFailed { source, .. }
            | ReconfigError::DownFailed { source, .. }
            | ReconfigError::AddressSetFailed { source, .. }
            | ReconfigError::UpFailed { source, .. } => *source,
        }
    }
}

/// Swaps the hardware address of a network interface.
///
/// The interface is taken down, readdressed and put back into the state it was found in.
/// One control channel is opened per [`apply`](Reconfigurator::apply) and always closed
/// before it returns. Nothing is retried.
pub struct Reconfigurator<C: NetControl> {
    control: C,
    stage: Stage,
}

impl<C: NetControl> Reconfigurator<C> {
    pub fn new(control: C) -> Self {
        Self {
            control,
            stage: Stage::Idle,
        }
    }

    /// The stage the last `apply` ended in.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn into_inner(self) -> C {
        self.control
    }

    pub fn apply(&mut self, name: &str, address: HardwareAddress) -> Result<(), ReconfigError> {
        self.stage = Stage::Idle;
        let name = InterfaceName::new(name);

        let channel = self
            .control
            .open()
            .map_err(ReconfigError::ChannelOpenFailed)?;
        let res = self.transition(&channel, &name, address);
        self.control.close(channel);
        res
    }

    fn transition(
        &mut self,
        channel: &C::Channel,
        name: &InterfaceName,
        address: HardwareAddress,
    ) -> Result<(), ReconfigError> {
        let original_flags = match self.control.query_flags(channel, name) {
            Ok(flags) => flags,
            Err(source) => {
                let name = name.to_string();
                return Err(ReconfigError::QueryFailed { name, source });
            }
        };

        let down = original_flags.without(InterfaceFlags::UP);
        if let Err(source) = self.control.set_flags(channel, name, down) {
            let name = name.to_string();
            return Err(ReconfigError::DownFailed { name, source });
        }
        self.advance(name, Stage::Down);

        if let Err(source) = self.control.set_hardware_address(channel, name, address) {
            match self.control.set_flags(channel, name, original_flags) {
                Ok(()) => self.advance(name, Stage::RolledBack),
                Err(err) => {
                    warn!("{name}: rollback to {original_flags:?} failed: {err}");
                    self.advance(name, Stage::DegradedDown);
                }
            }
            return Err(ReconfigError::AddressSetFailed {
                name: name.to_string(),
                source,
            });
        }
        self.advance(name, Stage::AddressSet);

        if let Err(source) = self.control.set_flags(channel, name, original_flags) {
            self.advance(name, Stage::DegradedAddressOnly);
            return Err(ReconfigError::UpFailed {
                name: name.to_string(),
                source,
            });
        }
        self.advance(name, Stage::Up);

        info!("{name}: hardware address set to {address}");
        Ok(())
    }

    fn advance(&mut self, name: &InterfaceName, stage: Stage) {
        debug!("{name}: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }
}
