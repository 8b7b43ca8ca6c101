use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "./data";

/// Runtime settings for the HTTP server. Resolution order is CLI flag, then
/// `FANGATE_*` environment variable, then the built-in default.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
}

impl ServerConfig {
    /// Builds a config from the environment, then applies any explicit
    /// overrides on top.
    pub fn resolve(
        host: Option<String>,
        port: Option<u16>,
        data_dir: Option<String>,
    ) -> Self {
        let env = Self::from_env();
        Self {
            host: host.unwrap_or(env.host),
            port: port.unwrap_or(env.port),
            data_dir: data_dir.map(PathBuf::from).unwrap_or(env.data_dir),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("FANGATE_HOST").unwrap_or(defaults.host),
            port: std::env::var("FANGATE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            data_dir: std::env::var("FANGATE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Database lives inside the data directory as a single file.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("fangate.db")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}
