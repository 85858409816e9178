//! Client configuration.

use std::{collections::BTreeMap, fmt};

/// Default notification server host.
pub const DEFAULT_SERVER_HOST: &str = "messenger.hotmail.com";

/// Default notification server port.
pub const DEFAULT_SERVER_PORT: u16 = 1863;

/// Notification server address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddr {
    /// Host name.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Default for ServerAddr {
    fn default() -> Self {
        Self { host: DEFAULT_SERVER_HOST.to_string(), port: DEFAULT_SERVER_PORT }
    }
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Proxy protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProxyKind {
    /// HTTP proxy.
    Http,
    /// HTTPS proxy, used by the SOAP services.
    Https,
    /// SOCKS proxy.
    Socks,
}

/// Proxy endpoint and optional credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyInfo {
    /// Proxy host.
    pub host: String,
    /// Proxy port.
    pub port: u16,
    /// Proxy user. `None` for anonymous proxies.
    pub user: Option<String>,
    /// Proxy password. `None` for anonymous proxies.
    pub password: Option<String>,
}

impl fmt::Debug for ProxyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyInfo")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Proxies available to the transport and services.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProxyConfig {
    proxies: BTreeMap<ProxyKind, ProxyInfo>,
}

impl ProxyConfig {
    /// Configuration without proxies.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add or replace the proxy for `kind`.
    #[must_use]
    pub fn with(mut self, kind: ProxyKind, info: ProxyInfo) -> Self {
        self.proxies.insert(kind, info);
        self
    }

    /// Proxy for `kind`. `None` if not configured.
    pub fn get(&self, kind: ProxyKind) -> Option<&ProxyInfo> {
        self.proxies.get(&kind)
    }

    /// Check if no proxy is configured.
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

/// Account credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account address.
    pub account: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Create credentials.
    pub fn new(account: impl Into<String>, password: impl Into<String>) -> Self {
        Self { account: account.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Notification server.
    pub server: ServerAddr,
    /// Proxies handed to the service factories.
    pub proxies: ProxyConfig,
}
