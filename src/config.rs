use clap::{Args, Parser};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const LISTEN_ADDR: &str = "0.0.0.0:8000";
const REDIS_PORT: u16 = 6379;
const TIMEOUT_SECS: u64 = 10;

/// HTTP demo that fills a Redis database with sample strings, hashes, sets, lists and sorted
/// sets.
#[derive(Parser, Debug, Clone)]
#[command(name = "redis-demo", version)]
pub struct Config {
    /// The address the HTTP server listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = LISTEN_ADDR)]
    pub listen: SocketAddr,

    /// Serve from an in-process store instead of connecting to Redis
    #[arg(long, env = "REDIS_DEMO_IN_MEMORY")]
    pub in_memory: bool,

    #[command(flatten)]
    pub redis: RedisConfig,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct RedisConfig {
    #[arg(long = "redis-host", env = "REDIS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long = "redis-port", env = "REDIS_PORT", default_value_t = REDIS_PORT)]
    pub port: u16,

    #[arg(long = "redis-username", env = "REDIS_USERNAME", default_value = "default")]
    pub username: String,

    #[arg(long = "redis-password", env = "REDIS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// PEM client certificate presented to the server
    #[arg(long, env = "CLIENT_CERT_PATH")]
    pub client_cert: Option<PathBuf>,

    /// PEM private key of the client certificate
    #[arg(long, env = "CLIENT_KEY_PATH")]
    pub client_key: Option<PathBuf>,

    /// PEM CA certificate used to verify the server
    #[arg(long, env = "SERVER_CA_PATH")]
    pub server_ca: Option<PathBuf>,

    /// Accept any server certificate. Insecure: only meant for sandboxes with self-signed
    /// certificates.
    #[arg(long, env = "REDIS_SKIP_SERVER_VERIFICATION")]
    pub skip_server_verification: bool,

    /// Connect over plain TCP
    #[arg(long, env = "REDIS_NO_TLS")]
    pub no_tls: bool,

    #[arg(long, env = "REDIS_CONNECT_TIMEOUT", value_name = "SECONDS", default_value_t = TIMEOUT_SECS)]
    pub connect_timeout: u64,

    #[arg(long, env = "REDIS_RESPONSE_TIMEOUT", value_name = "SECONDS", default_value_t = TIMEOUT_SECS)]
    pub response_timeout: u64,
}

impl RedisConfig {
    /// A plaintext configuration for a local server, mostly useful in tests.
    pub fn local(port: u16) -> RedisConfig {
        RedisConfig {
            host: "127.0.0.1".to_string(),
            port,
            username: "default".to_string(),
            password: None,
            client_cert: None,
            client_key: None,
            server_ca: None,
            skip_server_verification: false,
            no_tls: true,
            connect_timeout: TIMEOUT_SECS,
            response_timeout: TIMEOUT_SECS,
        }
    }

    pub fn tls(&self) -> bool {
        !self.no_tls
    }

    /// An empty password means no authentication.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides() {
        let config = Config::try_parse_from([
            "redis-demo",
            "--listen",
            "127.0.0.1:9000",
            "--redis-host",
            "db.internal",
            "--redis-port",
            "18777",
            "--redis-password",
            "secret",
            "--client-cert",
            "/app/client_cert.pem",
            "--client-key",
            "/app/client_key.pem",
            "--skip-server-verification",
            "--connect-timeout",
            "3",
        ])
        .unwrap();

        assert_eq!(config.listen, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.redis.host, "db.internal");
        assert_eq!(config.redis.port, 18777);
        assert_eq!(config.redis.password(), Some("secret"));
        assert_eq!(
            config.redis.client_cert,
            Some(PathBuf::from("/app/client_cert.pem"))
        );
        assert!(config.redis.skip_server_verification);
        assert!(config.redis.tls());
        assert_eq!(config.redis.connect_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn empty_password_means_none() {
        let mut config = RedisConfig::local(6379);
        assert_eq!(config.password(), None);

        config.password = Some(String::new());
        assert_eq!(config.password(), None);
    }

    #[test]
    fn rejects_invalid_port() {
        let res = Config::try_parse_from(["redis-demo", "--redis-port", "not-a-port"]);

        assert!(res.is_err());
    }
}
