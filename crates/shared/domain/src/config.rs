use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_PORT: u16 = 3001;

/// Everything the service reads at startup.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

/// Shared, copy-on-write handle to [`ApiConfigInner`].
///
/// Clones share one allocation; mutating through [`DerefMut`] detaches the mutated copy.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    /// Serves HTTPS when present.
    pub ssl: Option<SslConfig>,
}

/// PEM certificate and private key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Where the registry lives on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Sandbox root; every stored path is resolved under it.
    pub data_dir: PathBuf,
    /// Registry file, relative to `data_dir`. Its parent is created on first write.
    pub registry_file: PathBuf,
}

impl ServerConfig {
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        if self.ssl.is_some() { "https" } else { "http" }
    }
}

impl StorageConfig {
    /// Where the registry lands when `data_dir` is used as-is, before any sandboxing.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(&self.registry_file)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: DEFAULT_PORT, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("."), registry_file: PathBuf::from("data/emails.json") }
    }
}
