use std::net::Ipv4Addr;

use nix::{ifaddrs::getifaddrs, net::if_::InterfaceFlags, sys::socket::SockaddrStorage};

use super::{InterfaceAddr, Ipv4Source};
use crate::{Error, Result};

impl Ipv4Source for SockaddrStorage {
    fn ipv4(&self) -> Option<Ipv4Addr> {
        if let Some(sin) = self.as_sockaddr_in() {
            return Some(Ipv4Addr::from(sin.ip()));
        }
        self.as_sockaddr_in6().and_then(|sin6| sin6.ip().ipv4())
    }
}

/// Lists every interface address known to the kernel, in kernel order.
pub(super) fn interfaces() -> Result<Vec<InterfaceAddr<SockaddrStorage>>> {
    let addrs = getifaddrs().map_err(|_errno| {
        #[cfg(feature = "tracing")]
        tracing::warn!(error = %_errno, "failed to list network interfaces");
        Error::NoAddressFound
    })?;

    Ok(addrs
        .map(|ifaddr| InterfaceAddr {
            up: ifaddr.flags.contains(InterfaceFlags::IFF_UP),
            loopback: ifaddr.flags.contains(InterfaceFlags::IFF_LOOPBACK),
            name: ifaddr.interface_name,
            address: ifaddr.address,
        })
        .collect())
}
