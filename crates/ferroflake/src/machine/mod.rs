//! Machine ID derivation from the host's network configuration.
//!
//! The machine ID is the low 16 bits of the first non-loopback IPv4
//! address: the third octet in the high byte, the fourth in the low byte.
//! Two hosts collide only when those two octets coincide.

mod source;
#[cfg(unix)]
mod unix;

use std::net::Ipv4Addr;

pub use source::*;

use crate::{Error, Result};

/// One address entry of one network interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceAddr<A> {
    pub name: String,
    pub up: bool,
    pub loopback: bool,
    pub address: Option<A>,
}

/// Packs the third and fourth octets of `addr` into a machine ID.
///
/// ```
/// use std::net::Ipv4Addr;
/// use ferroflake::machine_id_from_ipv4;
///
/// assert_eq!(machine_id_from_ipv4(Ipv4Addr::new(10, 0, 3, 7)), 0x0307);
/// ```
pub const fn machine_id_from_ipv4(addr: Ipv4Addr) -> u16 {
    let [_, _, high, low] = addr.octets();
    u16::from_be_bytes([high, low])
}

/// Picks the machine ID from a list of interface addresses.
///
/// Interfaces that are down or loopback are skipped, as are addresses that
/// are loopback or have no IPv4 form. The first remaining address wins.
///
/// # Errors
///
/// Returns [`Error::NoAddressFound`] if nothing qualifies.
pub fn select_machine_id<A, I>(interfaces: I) -> Result<u16>
where
    A: Ipv4Source,
    I: IntoIterator<Item = InterfaceAddr<A>>,
{
    interfaces
        .into_iter()
        .filter(|iface| iface.up && !iface.loopback)
        .filter_map(|iface| iface.address.as_ref().and_then(|addr| addr.ipv4()))
        .find(|ip| !ip.is_loopback())
        .map(machine_id_from_ipv4)
        .ok_or(Error::NoAddressFound)
}

/// Resolves this host's machine ID from its network interfaces.
///
/// Call once at startup; the result does not change for a fixed network
/// configuration.
///
/// # Errors
///
/// Returns [`Error::NoAddressFound`] if no interface has a usable IPv4
/// address, or if interfaces cannot be listed on this platform.
pub fn resolve() -> Result<u16> {
    #[cfg(unix)]
    {
        let machine_id = select_machine_id(unix::interfaces()?)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(machine_id, "resolved machine id from network interfaces");
        Ok(machine_id)
    }
    #[cfg(not(unix))]
    {
        Err(Error::NoAddressFound)
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv6Addr};

    use super::*;

    fn iface(name: &str, up: bool, loopback: bool, address: IpAddr) -> InterfaceAddr<IpAddr> {
        InterfaceAddr {
            name: name.to_owned(),
            up,
            loopback,
            address: Some(address),
        }
    }

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn packs_low_two_octets() {
        assert_eq!(machine_id_from_ipv4(Ipv4Addr::new(192, 168, 1, 2)), 0x0102);
        assert_eq!(machine_id_from_ipv4(Ipv4Addr::new(10, 20, 255, 255)), 0xffff);
        assert_eq!(machine_id_from_ipv4(Ipv4Addr::new(10, 20, 0, 0)), 0);
    }

    #[test]
    fn skips_down_and_loopback_interfaces() {
        let interfaces = vec![
            iface("lo", true, true, v4(127, 0, 0, 1)),
            iface("eth0", false, false, v4(10, 0, 9, 9)),
            iface("eth1", true, false, v4(10, 0, 4, 2)),
        ];
        assert_eq!(select_machine_id(interfaces), Ok(0x0402));
    }

    #[test]
    fn skips_ipv6_and_loopback_addresses() {
        let interfaces = vec![
            iface("eth0", true, false, IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1))),
            // loopback address on an interface not flagged as loopback
            iface("dummy0", true, false, v4(127, 0, 0, 2)),
            InterfaceAddr {
                name: "tun0".to_owned(),
                up: true,
                loopback: false,
                address: None,
            },
            iface("eth0", true, false, v4(172, 16, 7, 8)),
        ];
        assert_eq!(select_machine_id(interfaces), Ok(0x0708));
    }

    #[test]
    fn accepts_ipv4_mapped_ipv6() {
        let mapped = IpAddr::V6(Ipv4Addr::new(10, 1, 2, 3).to_ipv6_mapped());
        let interfaces = vec![iface("eth0", true, false, mapped)];
        assert_eq!(select_machine_id(interfaces), Ok(0x0203));
    }

    #[test]
    fn first_qualifying_address_wins() {
        let interfaces = vec![
            iface("eth0", true, false, v4(10, 0, 1, 1)),
            iface("eth1", true, false, v4(10, 0, 2, 2)),
        ];
        assert_eq!(select_machine_id(interfaces), Ok(0x0101));
    }

    #[test]
    fn hosts_differing_in_low_octets_get_distinct_ids() {
        let host_a = vec![iface("eth0", true, false, v4(10, 0, 1, 5))];
        let host_b = vec![iface("eth0", true, false, v4(10, 0, 1, 6))];
        let host_c = vec![iface("eth0", true, false, v4(10, 0, 2, 5))];
        let a = select_machine_id(host_a).unwrap();
        let b = select_machine_id(host_b).unwrap();
        let c = select_machine_id(host_c).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn no_usable_address_fails() {
        let interfaces = vec![
            iface("lo", true, true, v4(127, 0, 0, 1)),
            iface("eth0", false, false, v4(10, 0, 0, 1)),
        ];
        assert_eq!(select_machine_id(interfaces), Err(Error::NoAddressFound));
        assert_eq!(
            select_machine_id(Vec::<InterfaceAddr<IpAddr>>::new()),
            Err(Error::NoAddressFound)
        );
    }

    #[test]
    fn resolve_is_stable_within_a_process() {
        assert_eq!(resolve(), resolve());
    }
}
