//! Peer registry: turns configured MAC addresses into reachable HTTP endpoints.
//!
//! Resolution runs once per cycle and its result is dropped at the end of the cycle, so an
//! address change on the network is picked up on the next pass.

use async_trait::async_trait;
use edgesync_types::PeerId;
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use tokio::process::Command;

/// A peer and the endpoint it can be reached at this cycle, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPeer {
    pub id: PeerId,
    pub endpoint: Option<String>,
}

#[async_trait]
pub trait PeerResolver: Send + Sync {
    /// Resolve every peer, preserving the input order.
    async fn resolve(&self, peers: &[PeerId]) -> Vec<ResolvedPeer>;
}

/// `mac=url` pair pinning a peer to a fixed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerEndpoint {
    pub peer: PeerId,
    pub url: String,
}

impl FromStr for PeerEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mac, url) = s
            .split_once('=')
            .ok_or_else(|| format!("expected MAC=URL, got '{s}'"))?;
        let peer: PeerId = mac.parse().map_err(|e| format!("{e}"))?;
        let parsed = url::Url::parse(url.trim()).map_err(|e| format!("invalid URL '{url}': {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!("unsupported URL scheme '{}'", parsed.scheme()));
        }
        Ok(Self { peer, url: parsed.as_str().trim_end_matches('/').to_string() })
    }
}

impl fmt::Display for PeerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.peer, self.url)
    }
}

/// Fixed endpoints only. Peers without an entry are unresolved.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    endpoints: HashMap<PeerId, String>,
}

impl StaticResolver {
    pub fn new(entries: impl IntoIterator<Item = PeerEndpoint>) -> Self {
        Self { endpoints: entries.into_iter().map(|e| (e.peer, e.url)).collect() }
    }

    pub fn get(&self, peer: &PeerId) -> Option<&str> {
        self.endpoints.get(peer).map(String::as_str)
    }
}

#[async_trait]
impl PeerResolver for StaticResolver {
    async fn resolve(&self, peers: &[PeerId]) -> Vec<ResolvedPeer> {
        peers
            .iter()
            .map(|id| ResolvedPeer { id: id.clone(), endpoint: self.get(id).map(str::to_string) })
            .collect()
    }
}

/// Looks peers up in the host's ARP table (`arp -n`), after any static overrides.
pub struct ArpResolver {
    port: u16,
    overrides: StaticResolver,
}

impl ArpResolver {
    pub fn new(port: u16, overrides: StaticResolver) -> Self {
        Self { port, overrides }
    }

    async fn read_arp_table() -> HashMap<PeerId, IpAddr> {
        match Command::new("arp").arg("-n").output().await {
            Ok(output) if output.status.success() => {
                parse_arp_table(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                tracing::error!("[Peers] arp exited with {}", output.status);
                HashMap::new()
            }
            Err(e) => {
                tracing::error!("[Peers] Failed to run arp: {}", e);
                HashMap::new()
            }
        }
    }
}

#[async_trait]
impl PeerResolver for ArpResolver {
    async fn resolve(&self, peers: &[PeerId]) -> Vec<ResolvedPeer> {
        let needs_arp = peers.iter().any(|p| self.overrides.get(p).is_none());
        let table = if needs_arp { Self::read_arp_table().await } else { HashMap::new() };

        peers
            .iter()
            .map(|id| {
                let endpoint = self.overrides.get(id).map(str::to_string).or_else(|| {
                    table.get(id).map(|ip| format!("http://{}", SocketAddr::new(*ip, self.port)))
                });
                if endpoint.is_none() {
                    tracing::warn!("[Peers] No IP address found for peer {}", id);
                }
                ResolvedPeer { id: id.clone(), endpoint }
            })
            .collect()
    }
}

/// Extract `MAC -> IP` pairs from `arp -n` style output: the first column is the address
/// and some later column is the hardware address. Incomplete entries are skipped.
pub fn parse_arp_table(output: &str) -> HashMap<PeerId, IpAddr> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let ip: IpAddr = fields.next()?.parse().ok()?;
            let mac = fields.find_map(|f| f.parse::<PeerId>().ok())?;
            Some((mac, ip))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARP_OUTPUT: &str = "\
Address                  HWtype  HWaddress           Flags Mask            Iface
192.168.1.20             ether   12:81:08:B1:66:B6   C                     eth0
192.168.1.21                     (incomplete)                              eth0
192.168.1.22             ether   12:81:f8:16:b9:f9   C                     eth0
";

    fn mac(s: &str) -> PeerId {
        s.parse().expect("valid mac")
    }

    #[test]
    fn test_parse_arp_table() {
        let table = parse_arp_table(ARP_OUTPUT);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&mac("12:81:08:b1:66:b6")), Some(&"192.168.1.20".parse().unwrap()));
        assert_eq!(table.get(&mac("12:81:f8:16:b9:f9")), Some(&"192.168.1.22".parse().unwrap()));
    }

    #[test]
    fn test_peer_endpoint_parse() {
        let entry: PeerEndpoint = "12-81-D7-01-CB-11=http://10.0.0.5:5100/".parse().unwrap();
        assert_eq!(entry.peer, mac("12:81:d7:01:cb:11"));
        assert_eq!(entry.url, "http://10.0.0.5:5100");
        assert!("12:81:d7:01:cb:11".parse::<PeerEndpoint>().is_err());
        assert!("12:81:d7:01:cb:11=ftp://host".parse::<PeerEndpoint>().is_err());
        assert!("nope=http://host".parse::<PeerEndpoint>().is_err());
    }

    #[tokio::test]
    async fn test_static_resolver_keeps_order_and_marks_unknown() {
        let resolver = StaticResolver::new(["12:81:08:b1:66:b6=http://a:5100".parse().unwrap()]);
        let peers = vec![mac("12:81:f8:16:b9:f9"), mac("12:81:08:b1:66:b6")];
        let resolved = resolver.resolve(&peers).await;
        assert_eq!(resolved[0].id, peers[0]);
        assert_eq!(resolved[0].endpoint, None);
        assert_eq!(resolved[1].endpoint.as_deref(), Some("http://a:5100"));
    }

    #[tokio::test]
    async fn test_arp_resolver_prefers_overrides() {
        let overrides = StaticResolver::new(["12:81:08:b1:66:b6=http://pinned:8080".parse().unwrap()]);
        let resolver = ArpResolver::new(5100, overrides);
        let resolved = resolver.resolve(&[mac("12:81:08:b1:66:b6")]).await;
        assert_eq!(resolved[0].endpoint.as_deref(), Some("http://pinned:8080"));
    }
}
