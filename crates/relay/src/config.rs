use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: IpAddr,
    pub port: u16,

    /// Base URL of the plan generator; `/generate-plan` is appended.
    pub upstream_url: String,
    pub upstream_timeout: Duration,
}

impl RelayConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            upstream_url: "http://backend-flask:5000".into(),
            upstream_timeout: Duration::from_secs(30),
        }
    }
}
