use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// Anything that may carry an IPv4 address.
///
/// Interface listings hand back different address representations per
/// platform; machine ID selection only needs the 4-byte form. IPv4-mapped
/// IPv6 addresses (`::ffff:a.b.c.d`) count as IPv4.
pub trait Ipv4Source {
    /// Returns the IPv4 form of this address, if it has one.
    fn ipv4(&self) -> Option<Ipv4Addr>;
}

impl Ipv4Source for Ipv4Addr {
    fn ipv4(&self) -> Option<Ipv4Addr> {
        Some(*self)
    }
}

impl Ipv4Source for Ipv6Addr {
    fn ipv4(&self) -> Option<Ipv4Addr> {
        self.to_ipv4_mapped()
    }
}

impl Ipv4Source for IpAddr {
    fn ipv4(&self) -> Option<Ipv4Addr> {
        match self {
            IpAddr::V4(v4) => v4.ipv4(),
            IpAddr::V6(v6) => v6.ipv4(),
        }
    }
}

impl Ipv4Source for SocketAddr {
    fn ipv4(&self) -> Option<Ipv4Addr> {
        self.ip().ipv4()
    }
}
