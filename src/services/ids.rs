// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Host-qualified id generation without a central allocator.
//!
//! Ids are `(host_prefix << 16) + counter` in 32-bit wrapping arithmetic.
//! They are unique within a process, and unique across hosts as long as
//! every host gets a distinct prefix.

use std::net::{IpAddr, UdpSocket};
use std::sync::atomic::{AtomicU32, Ordering};

/// Prefix used when the local address cannot be resolved.
///
/// Every host that falls back shares this prefix, so their ids can collide.
/// Configure `ID_HOST_PREFIX` on such hosts.
pub const FALLBACK_HOST_PREFIX: u16 = 42;

/// Mints entity ids. One instance per process, shared by reference.
pub trait IdentifierGenerator: Send + Sync {
    fn generate_id(&self) -> u64;
}

/// Where the host prefix came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixSource {
    Configured,
    LocalAddress,
    Fallback,
}

/// Counter-based generator qualified by a 16-bit host prefix.
#[derive(Debug)]
pub struct HostPrefixGenerator {
    prefix: u16,
    source: PrefixSource,
    counter: AtomicU32,
}

impl HostPrefixGenerator {
    pub fn with_prefix(prefix: u16) -> Self {
        Self {
            prefix,
            source: PrefixSource::Configured,
            counter: AtomicU32::new(0),
        }
    }

    /// Use the configured prefix if any, else derive one from the local address.
    pub fn from_config(configured: Option<u16>) -> Self {
        if let Some(prefix) = configured {
            tracing::info!(prefix, "Using configured id host prefix");
            return Self::with_prefix(prefix);
        }

        match local_address() {
            Some(ip) => {
                let prefix = prefix_from_ip(ip);
                tracing::info!(prefix, address = %ip, "Derived id host prefix from local address");
                Self {
                    prefix,
                    source: PrefixSource::LocalAddress,
                    counter: AtomicU32::new(0),
                }
            }
            None => {
                tracing::warn!(
                    prefix = FALLBACK_HOST_PREFIX,
                    "Could not resolve local address; using fallback id host prefix. \
                     Ids may collide with other hosts using the fallback; set ID_HOST_PREFIX"
                );
                Self {
                    prefix: FALLBACK_HOST_PREFIX,
                    source: PrefixSource::Fallback,
                    counter: AtomicU32::new(0),
                }
            }
        }
    }

    pub fn prefix(&self) -> u16 {
        self.prefix
    }

    pub fn source(&self) -> PrefixSource {
        self.source
    }
}

impl IdentifierGenerator for HostPrefixGenerator {
    fn generate_id(&self) -> u64 {
        // Overflow wraps silently.
        let next = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let id = (u32::from(self.prefix) << 16).wrapping_add(next);
        u64::from(id)
    }
}

/// Low 16 bits of the address bytes accumulated big-endian.
pub fn prefix_from_ip(ip: IpAddr) -> u16 {
    let octets: Vec<u8> = match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    };
    octets
        .iter()
        .fold(0u16, |acc, &b| (acc << 8) | u16::from(b))
}

/// Address of the interface that would route outbound traffic.
///
/// `connect` on a UDP socket only selects a route; nothing is sent.
fn local_address() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    if ip.is_unspecified() {
        None
    } else {
        Some(ip)
    }
}
