use std::os::fd::{AsRawFd, OwnedFd};

use log::trace;
use nix::libc::{self, c_char, ifreq, sockaddr, ARPHRD_ETHER};
use nix::sys::socket::{socket, AddressFamily, SockFlag, SockType};

use crate::mac::HardwareAddress;
use crate::netdev::{InterfaceFlags, InterfaceName, NetControl};

nix::ioctl_read_bad!(siocgifflags, libc::SIOCGIFFLAGS, ifreq);
nix::ioctl_write_ptr_bad!(siocsifflags, libc::SIOCSIFFLAGS, ifreq);
nix::ioctl_write_ptr_bad!(siocsifhwaddr, libc::SIOCSIFHWADDR, ifreq);

/// Reconfigures devices with `SIOC*IF*` ioctls on a throwaway datagram socket.
#[derive(Debug, Default, Clone, Copy)]
pub struct IoctlControl;

fn request(name: &InterfaceName) -> ifreq {
    let mut req: ifreq = unsafe { std::mem::zeroed() };
    req.ifr_name = *name.as_raw();
    req
}

impl NetControl for IoctlControl {
    type Channel = OwnedFd;

    fn open(&mut self) -> nix::Result<OwnedFd> {
        let fd = socket(
            AddressFamily::Inet,
            SockType::Datagram,
            SockFlag::SOCK_CLOEXEC,
            None,
        )?;
        trace!("opened control socket fd {}", fd.as_raw_fd());
        Ok(fd)
    }

    fn query_flags(
        &mut self,
        channel: &OwnedFd,
        name: &InterfaceName,
    ) -> nix::Result<InterfaceFlags> {
        let mut req = request(name);
        unsafe {
            siocgifflags(channel.as_raw_fd(), &mut req)?;
        }
        let flags = InterfaceFlags::from_bits(unsafe { req.ifr_ifru.ifru_flags });
        trace!("SIOCGIFFLAGS {name}: {flags:?}");
        Ok(flags)
    }

    fn set_flags(
        &mut self,
        channel: &OwnedFd,
        name: &InterfaceName,
        flags: InterfaceFlags,
    ) -> nix::Result<()> {
        let mut req = request(name);
        req.ifr_ifru.ifru_flags = flags.bits();
        trace!("SIOCSIFFLAGS {name}: {flags:?}");
        unsafe {
            siocsifflags(channel.as_raw_fd(), &req)?;
        }
        Ok(())
    }

    fn set_hardware_address(
        &mut self,
        channel: &OwnedFd,
        name: &InterfaceName,
        address: HardwareAddress,
    ) -> nix::Result<()> {
        let mut hwaddr: sockaddr = unsafe { std::mem::zeroed() };
        hwaddr.sa_family = ARPHRD_ETHER;
        for (dst, src) in hwaddr.sa_data.iter_mut().zip(address.octets()) {
            *dst = src as c_char;
        }

        let mut req = request(name);
        req.ifr_ifru.ifru_hwaddr = hwaddr;
        trace!("SIOCSIFHWADDR {name}: {address}");
        unsafe {
            siocsifhwaddr(channel.as_raw_fd(), &req)?;
        }
        Ok(())
    }

    fn close(&mut self, channel: OwnedFd) {
        trace!("closing control socket fd {}", channel.as_raw_fd());
        drop(channel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_name() {
        let req = request(&InterfaceName::new("eth0"));
        assert_eq!(&req.ifr_name, InterfaceName::new("eth0").as_raw());
        assert_eq!(unsafe { req.ifr_ifru.ifru_flags }, 0);
    }

    #[test]
    fn test_query_unknown_interface() {
        let mut control = IoctlControl;
        let channel = control.open().unwrap();
        let res = control.query_flags(&channel, &InterfaceName::new("nosuchdev0"));
        assert_eq!(res, Err(nix::errno::Errno::ENODEV));
        control.close(channel);
    }
}
