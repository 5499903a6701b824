use crate::error::{Error, Result};
use common::proxy::anthropic::ANTHROPIC_API_URL;
use faststr::FastStr;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 4173;

/// Startup settings, read once from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr:         SocketAddr,
    pub static_dir:   PathBuf,
    pub upstream_url: FastStr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr:         SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            static_dir:   PathBuf::from("."),
            upstream_url: FastStr::from_static_str(ANTHROPIC_API_URL),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(host) = lookup("LEARNLY_HOST") {
            let ip = host
                .parse::<IpAddr>()
                .map_err(|_| Error::Config("LEARNLY_HOST", host.into()))?;
            config.addr.set_ip(ip);
        }
        if let Some(port) = lookup("LEARNLY_PORT") {
            let port = port
                .parse::<u16>()
                .map_err(|_| Error::Config("LEARNLY_PORT", port.into()))?;
            config.addr.set_port(port);
        }
        if let Some(dir) = lookup("LEARNLY_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("LEARNLY_UPSTREAM_URL") {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::Config("LEARNLY_UPSTREAM_URL", url.into()));
            }
            config.upstream_url = url.into();
        }
        Ok(config)
    }
}
