//! Hostname lookup and IPv4 selection.

use std::io;
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};

use log::debug;

use crate::error::{ExecError, Result};

pub trait Resolver {
    fn lookup(&self, hostname: &str) -> io::Result<Vec<IpAddr>>;
}

/// The platform resolver (`getaddrinfo` and friends).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn lookup(&self, hostname: &str) -> io::Result<Vec<IpAddr>> {
        // Port is irrelevant here; the caller pairs the address with its own.
        let addrs = (hostname, 0).to_socket_addrs()?;
        Ok(addrs.map(|a| a.ip()).collect())
    }
}

/// Picks the last IPv4 entry in resolution order. IPv6 entries are skipped.
pub fn select_ipv4(addrs: &[IpAddr]) -> Option<Ipv4Addr> {
    addrs.iter().rev().find_map(|addr| match addr {
        IpAddr::V4(v4) => Some(*v4),
        IpAddr::V6(_) => None,
    })
}

pub fn resolve_ipv4<R: Resolver + ?Sized>(resolver: &R, hostname: &str) -> Result<Ipv4Addr> {
    let addrs = resolver
        .lookup(hostname)
        .map_err(|e| ExecError::Resolution {
            host: hostname.to_string(),
            reason: e.to_string(),
        })?;
    debug!("{} resolved to {:?}", hostname, addrs);

    select_ipv4(&addrs).ok_or_else(|| ExecError::Resolution {
        host: hostname.to_string(),
        reason: format!("no IPv4 address among {} result(s)", addrs.len()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    struct Fixed(Vec<IpAddr>);

    impl Resolver for Fixed {
        fn lookup(&self, _hostname: &str) -> io::Result<Vec<IpAddr>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn last_ipv4_wins() {
        let addrs = vec![
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
            IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        ];
        assert_eq!(select_ipv4(&addrs), Some(Ipv4Addr::new(10, 0, 0, 2)));
    }

    #[test]
    fn ipv6_only_is_a_resolution_error() {
        let resolver = Fixed(vec![IpAddr::V6(Ipv6Addr::LOCALHOST)]);
        let err = resolve_ipv4(&resolver, "six.example").unwrap_err();
        assert!(matches!(err, ExecError::Resolution { ref host, .. } if host == "six.example"));
    }

    #[test]
    fn ip_literal_resolves_to_itself() {
        let ip = resolve_ipv4(&SystemResolver, "127.0.0.1").unwrap();
        assert_eq!(ip, Ipv4Addr::LOCALHOST);
    }
}
