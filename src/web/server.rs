//! Web server for the forum API.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::auth::TokenService;
use crate::config::Config;
use crate::db::SharedDatabase;
use crate::{AgoraError, Result};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(addr: SocketAddr, app_state: AppState, cors_origins: Vec<String>) -> Self {
        Self {
            addr,
            app_state: Arc::new(app_state),
            cors_origins,
        }
    }

    /// Create a web server from the loaded configuration.
    pub fn from_config(config: &Config, db: SharedDatabase) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| AgoraError::Config(format!("invalid server address: {e}")))?;

        let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_expiry_secs);
        let app_state = AppState::new(db, tokens, config.forum.clone());

        Ok(Self::new(addr, app_state, config.server.cors_origins.clone()))
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn into_router(self) -> axum::Router {
        create_router(self.app_state, &self.cors_origins)
            .merge(create_health_router())
            .layer(CompressionLayer::new())
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.into_router();

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.into_router();

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn create_test_config() -> Config {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.auth.jwt_secret = "test-secret-key".to_string();
        config
    }

    #[tokio::test]
    async fn test_web_server_from_config() {
        let config = create_test_config();
        let db = Database::open_in_memory().await.unwrap();

        let server = WebServer::from_config(&config, Arc::new(db)).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_web_server_invalid_address() {
        let mut config = create_test_config();
        config.server.host = "not an address".to_string();
        let db = Database::open_in_memory().await.unwrap();

        let result = WebServer::from_config(&config, Arc::new(db));
        assert!(matches!(result, Err(AgoraError::Config(_))));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let config = create_test_config();
        let db = Database::open_in_memory().await.unwrap();

        let server = WebServer::from_config(&config, Arc::new(db)).unwrap();
        let addr = server.run_with_addr().await.unwrap();

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        let (head, body) = response.split_once("\r\n\r\n").unwrap();
        let body = if head.to_ascii_lowercase().contains("transfer-encoding: chunked") {
            decode_chunked(body)
        } else {
            body.to_string()
        };
        assert_eq!(body, "OK");
    }

    fn decode_chunked(mut raw: &str) -> String {
        let mut body = String::new();
        loop {
            let (size, rest) = raw.split_once("\r\n").unwrap();
            let size = usize::from_str_radix(size.trim(), 16).unwrap();
            if size == 0 {
                return body;
            }
            body.push_str(&rest[..size]);
            raw = &rest[size + 2..];
        }
    }
}
