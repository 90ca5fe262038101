use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        }
    }

    /// Socket address to bind. An unparseable host falls back to all interfaces.
    pub fn bind_addr(&self) -> SocketAddr {
        let ip = self.host.parse::<IpAddr>().unwrap_or_else(|_| {
            tracing::warn!(host = %self.host, "Invalid HOST, binding to 0.0.0.0");
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        });
        SocketAddr::new(ip, self.port)
    }
}
