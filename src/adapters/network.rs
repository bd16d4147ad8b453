use crate::config::toml_config::NetworkConfig;
use crate::core::{LocalAddressResolver, PublicAddressLookup};
use crate::utils::error::{LauncherError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::net::{IpAddr, UdpSocket};
use std::time::Duration;
use sysinfo::Networks;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub name: String,
    pub addr: IpAddr,
}

/// Addresses worth showing to a user on the LAN: IPv4, not loopback,
/// not link-local, not unspecified.
pub fn is_reachable_candidate(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => !(v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()),
        IpAddr::V6(_) => false,
    }
}

/// Pick the local address: preferred interfaces in order, then the first
/// candidate by interface name.
pub fn select_local_address(interfaces: &[InterfaceAddress], preferred: &[String]) -> Option<IpAddr> {
    let candidates: Vec<&InterfaceAddress> = interfaces
        .iter()
        .filter(|iface| is_reachable_candidate(&iface.addr))
        .collect();

    for name in preferred {
        if let Some(found) = candidates.iter().find(|iface| &iface.name == name) {
            return Some(found.addr);
        }
    }

    candidates
        .iter()
        .min_by(|a, b| a.name.cmp(&b.name))
        .map(|iface| iface.addr)
}

/// Local address discovery through the OS interface table.
#[derive(Debug, Clone)]
pub struct InterfaceResolver {
    preferred: Vec<String>,
    probe_target: String,
}

impl InterfaceResolver {
    pub fn new(preferred: Vec<String>, probe_target: impl Into<String>) -> Self {
        Self {
            preferred,
            probe_target: probe_target.into(),
        }
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(
            config.preferred_interfaces.clone(),
            config.route_probe_target.clone(),
        )
    }

    pub fn list_interfaces() -> Vec<InterfaceAddress> {
        let networks = Networks::new_with_refreshed_list();
        let mut interfaces = Vec::new();
        for (name, data) in networks.list() {
            for network in data.ip_networks() {
                interfaces.push(InterfaceAddress {
                    name: name.clone(),
                    addr: network.addr,
                });
            }
        }
        tracing::debug!("Found {} interface addresses", interfaces.len());
        interfaces
    }

    /// Address the OS would use for outbound traffic. Connecting a UDP socket
    /// only selects a route; nothing is sent.
    fn route_probe(&self) -> Option<IpAddr> {
        let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect(self.probe_target.as_str()).ok()?;
        let addr = socket.local_addr().ok()?.ip();
        is_reachable_candidate(&addr).then_some(addr)
    }
}

impl LocalAddressResolver for InterfaceResolver {
    fn local_address(&self) -> Option<IpAddr> {
        select_local_address(&Self::list_interfaces(), &self.preferred).or_else(|| {
            tracing::debug!("No interface address found, trying route probe");
            self.route_probe()
        })
    }
}

/// Public address from a plain-text "what is my IP" service.
#[derive(Debug, Clone)]
pub struct HttpPublicIpLookup {
    client: Client,
    service: String,
}

impl HttpPublicIpLookup {
    pub fn new(service: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            service: service.into(),
        })
    }

    pub fn from_config(config: &NetworkConfig) -> Result<Self> {
        Self::new(
            config.public_ip_service.clone(),
            Duration::from_secs(config.lookup_timeout_seconds),
        )
    }

    pub async fn fetch(&self) -> Result<IpAddr> {
        tracing::debug!("Requesting public address from {}", self.service);
        let response = self.client.get(&self.service).send().await?;
        let body = response.error_for_status()?.text().await?;

        body.trim()
            .parse::<IpAddr>()
            .map_err(|e| LauncherError::UnexpectedResponse {
                service: self.service.clone(),
                message: format!("'{}' is not an IP address: {}", body.trim(), e),
            })
    }
}

#[async_trait]
impl PublicAddressLookup for HttpPublicIpLookup {
    async fn public_address(&self) -> Option<IpAddr> {
        match self.fetch().await {
            Ok(ip) => Some(ip),
            Err(e) => {
                tracing::debug!("Public address lookup failed: {}", e);
                None
            }
        }
    }
}
