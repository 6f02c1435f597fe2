use ::redis::aio::MultiplexedConnection;
use ::redis::{
    AsyncCommands, Client, ClientTlsConfig, ConnectionAddr, ConnectionInfo, ErrorKind, InfoDict,
    RedisConnectionInfo, RedisError, RedisResult, TlsCertificates,
};
use async_trait::async_trait;
use std::fs;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::config::RedisConfig;
use crate::store::KvStore;

/// A [`KvStore`] backed by a single multiplexed Redis connection.
///
/// The connection is established once and cloned per command, so concurrent requests share
/// it without locking.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Connects to the configured server and checks the connection with a PING. There is no
    /// retry: any failure (I/O, TLS handshake, authentication) is returned to the caller.
    #[instrument(name = "bootstrap", skip(config), fields(host = %config.host, port = config.port))]
    pub async fn connect(config: &RedisConfig) -> RedisResult<RedisStore> {
        info!(
            "Connecting to Redis at {}:{} ({})",
            config.host,
            config.port,
            if config.tls() { "TLS" } else { "plaintext" }
        );

        if config.tls() && config.skip_server_verification {
            warn!("Server certificate verification is disabled");
        }

        let client = client(config)?;
        let conn = client
            .get_multiplexed_async_connection_with_timeouts(
                config.response_timeout(),
                config.connect_timeout(),
            )
            .await?;

        let store = RedisStore { conn };
        store.ping().await?;

        info!("Connected to Redis");
        Ok(store)
    }

    fn conn(&self) -> MultiplexedConnection {
        self.conn.clone()
    }
}

fn client(config: &RedisConfig) -> RedisResult<Client> {
    let addr = if config.tls() {
        ConnectionAddr::TcpTls {
            host: config.host.clone(),
            port: config.port,
            insecure: config.skip_server_verification,
            tls_params: None,
        }
    } else {
        ConnectionAddr::Tcp(config.host.clone(), config.port)
    };

    let info = ConnectionInfo {
        addr,
        redis: RedisConnectionInfo {
            username: Some(config.username.clone()),
            password: config.password().map(str::to_string),
            ..Default::default()
        },
    };

    if !config.tls() {
        return Client::open(info);
    }

    Client::build_with_tls(info, tls_certificates(config)?)
}

fn tls_certificates(config: &RedisConfig) -> RedisResult<TlsCertificates> {
    let client_tls = match (&config.client_cert, &config.client_key) {
        (Some(cert), Some(key)) => Some(ClientTlsConfig {
            client_cert: read_pem(cert)?,
            client_key: read_pem(key)?,
        }),
        (None, None) => None,
        _ => {
            return Err(RedisError::from((
                ErrorKind::InvalidClientConfig,
                "client certificate and key must be configured together",
            )))
        }
    };

    let root_cert = config.server_ca.as_deref().map(read_pem).transpose()?;

    Ok(TlsCertificates {
        client_tls,
        root_cert,
    })
}

fn read_pem(path: &Path) -> RedisResult<Vec<u8>> {
    fs::read(path).map_err(|e| {
        RedisError::from((
            ErrorKind::InvalidClientConfig,
            "unable to read certificate file",
            format!("{}: {}", path.display(), e),
        ))
    })
}

#[async_trait]
impl KvStore for RedisStore {
    async fn ping(&self) -> RedisResult<()> {
        let _: String = ::redis::cmd("PING").query_async(&mut self.conn()).await?;
        Ok(())
    }

    async fn set_string(&self, key: &str, value: &str) -> RedisResult<()> {
        self.conn().set(key, value).await
    }

    async fn set_hash(&self, key: &str, fields: &[(&str, String)]) -> RedisResult<()> {
        self.conn().hset_multiple(key, fields).await
    }

    async fn add_to_set(&self, key: &str, members: &[String]) -> RedisResult<()> {
        let _: u64 = self.conn().sadd(key, members).await?;
        Ok(())
    }

    async fn push_to_list(&self, key: &str, items: &[String]) -> RedisResult<()> {
        let _: u64 = self.conn().lpush(key, items).await?;
        Ok(())
    }

    async fn add_to_sorted_set(&self, key: &str, members: &[(u32, String)]) -> RedisResult<()> {
        let _: u64 = self.conn().zadd_multiple(key, members).await?;
        Ok(())
    }

    async fn info(&self) -> RedisResult<InfoDict> {
        ::redis::cmd("INFO").query_async(&mut self.conn()).await
    }

    async fn db_size(&self) -> RedisResult<u64> {
        ::redis::cmd("DBSIZE").query_async(&mut self.conn()).await
    }

    async fn flush_db(&self) -> RedisResult<()> {
        ::redis::cmd("FLUSHDB").query_async(&mut self.conn()).await
    }
}
