use std::net::{IpAddr, UdpSocket};

use mac_address::MacAddress;

use super::advertiser::AdvertiseError;

/// Network identity of the machine the service runs on.
#[derive(Clone, Debug)]
pub struct HostIdentity {
    pub hardware_address: MacAddress,
    pub host_name: String,
    pub interface: String,
    pub ip_addr: IpAddr,
}

impl HostIdentity {
    /// Resolve the identity from the interface that owns the outbound route.
    pub fn resolve() -> Result<Self, AdvertiseError> {
        let host_name = hostname::get()?.to_string_lossy().into_owned();
        let ip_addr = outbound_ip()?;

        let interface = if_addrs::get_if_addrs()?
            .into_iter()
            .find(|iface| iface.ip() == ip_addr)
            .ok_or(AdvertiseError::HardwareAddressNotFound)?;

        let hardware_address = mac_address::mac_address_by_name(&interface.name)?
            .ok_or(AdvertiseError::HardwareAddressNotFound)?;

        Ok(Self {
            hardware_address,
            host_name,
            interface: interface.name,
            ip_addr,
        })
    }

    /// Service instance name: host name and address joined with `__`.
    ///
    /// Dots and colons in the address become `--`, so the address part can
    /// never collide with the separator.
    pub fn instance_name(&self) -> String {
        let sanitized = self.ip_addr.to_string().replace(['.', ':'], "--");
        format!("{}__{}", self.host_name, sanitized)
    }
}

/// Address the default route sends traffic from. No packet leaves the host:
/// connecting a UDP socket only consults the routing table.
fn outbound_ip() -> Result<IpAddr, AdvertiseError> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect("8.8.8.8:80")?;
    Ok(socket.local_addr()?.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_identity(ip: &str) -> HostIdentity {
        HostIdentity {
            hardware_address: MacAddress::new([0, 1, 2, 3, 4, 5]),
            host_name: "atlas".to_string(),
            interface: "eth0".to_string(),
            ip_addr: ip.parse().unwrap(),
        }
    }

    #[test]
    fn test_instance_name_sanitizes_ipv4() {
        let identity = make_identity("192.168.1.42");
        assert_eq!(identity.instance_name(), "atlas__192--168--1--42");
    }

    #[test]
    fn test_instance_name_sanitizes_ipv6() {
        let identity = make_identity("fe80::1");
        assert_eq!(identity.instance_name(), "atlas__fe80----1");
    }
}
