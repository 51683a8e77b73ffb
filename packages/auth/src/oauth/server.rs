// ABOUTME: OAuth callback server for receiving the authorization redirect
// ABOUTME: Listens on the redirect URI's local address and extracts the callback query parameters

use std::{net::SocketAddr, time::Duration};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    time::timeout,
};
use tracing::{debug, error, info};
use url::Url;

use crate::{
    error::{AuthError, AuthResult},
    oauth::types::CallbackParams,
};

/// How long a single connection may take to send its request line
const CALLBACK_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// OAuth callback server configuration derived from the redirect URI
#[derive(Debug, Clone)]
pub struct CallbackServer {
    host: String,
    port: u16,
    path: String,
}

impl CallbackServer {
    /// Derive bind address and callback path from a local redirect URI
    pub fn from_redirect_uri(redirect_uri: &str) -> AuthResult<Self> {
        let url = Url::parse(redirect_uri)
            .map_err(|e| AuthError::Configuration(format!("Invalid redirect URI: {}", e)))?;

        let host = match url.host_str() {
            Some("localhost") => "127.0.0.1".to_string(),
            Some(host) => host.to_string(),
            None => {
                return Err(AuthError::Configuration(
                    "Redirect URI has no host".to_string(),
                ))
            }
        };
        let port = url.port_or_known_default().ok_or_else(|| {
            AuthError::Configuration("Redirect URI has no port".to_string())
        })?;

        Ok(Self {
            host,
            port,
            path: url.path().to_string(),
        })
    }

    /// Bind the listener. Bind before starting sign-in so the redirect cannot arrive early.
    pub async fn listen(&self) -> AuthResult<CallbackListener> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AuthError::CallbackServer(format!("Failed to bind to {}: {}", addr, e)))?;

        info!("📡 Waiting for OAuth callback on {}", addr);

        Ok(CallbackListener {
            listener,
            path: self.path.clone(),
            read_timeout: CALLBACK_READ_TIMEOUT,
        })
    }
}

/// Bound callback listener
pub struct CallbackListener {
    listener: TcpListener,
    path: String,
    read_timeout: Duration,
}

impl CallbackListener {
    /// Override how long a connection may stay silent before it is dropped
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn local_addr(&self) -> AuthResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until one targets the callback path, then return its parameters
    pub async fn accept_callback(&self) -> AuthResult<CallbackParams> {
        loop {
            let (mut stream, peer_addr) = self.listener.accept().await.map_err(|e| {
                AuthError::CallbackServer(format!("Failed to accept connection: {}", e))
            })?;
            debug!("Received connection from {}", peer_addr);

            let mut buffer = vec![0; 4096];
            // An idle connection must not block the real redirect behind it
            let n = match timeout(self.read_timeout, stream.read(&mut buffer)).await {
                Ok(Ok(n)) => n,
                Ok(Err(e)) => {
                    debug!("Failed to read request from {}: {}", peer_addr, e);
                    continue;
                }
                Err(_) => {
                    debug!("Dropping idle connection from {}", peer_addr);
                    continue;
                }
            };
            let request = String::from_utf8_lossy(&buffer[..n]);

            let Some(target) = request_target(&request) else {
                let _ = stream.write_all(not_found_response().as_bytes()).await;
                continue;
            };

            let (path, query) = target.split_once('?').unwrap_or((target, ""));
            if path != self.path {
                // Browsers also ask for /favicon.ico and the like
                let _ = stream.write_all(not_found_response().as_bytes()).await;
                continue;
            }

            let params = CallbackParams::from_query(query);
            let response = match &params.error {
                Some(err) => error_response(err),
                None => success_response(),
            };
            if let Err(e) = stream.write_all(response.as_bytes()).await {
                error!("Failed to send callback response: {}", e);
            }

            info!("Received OAuth callback");
            return Ok(params);
        }
    }
}

/// Extract the request target from the HTTP request line (`GET <target> HTTP/1.1`)
fn request_target(request: &str) -> Option<&str> {
    let first_line = request.lines().next()?;
    let mut parts = first_line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("GET"), Some(target)) => Some(target),
        _ => None,
    }
}

fn success_response() -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        SUCCESS_HTML.len(),
        SUCCESS_HTML
    )
}

fn error_response(error_msg: &str) -> String {
    let html = format!(
        r#"<html><body><h1>Authentication Failed</h1><p>{}</p><p>You can close this tab and return to your terminal.</p></body></html>"#,
        html_escape(error_msg)
    );
    format!(
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        html.len(),
        html
    )
}

fn not_found_response() -> String {
    "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const SUCCESS_HTML: &str = r#"<html>
<head>
    <title>Signed in to Scout</title>
    <style>
        body { font-family: system-ui, -apple-system, sans-serif; max-width: 600px; margin: 100px auto; text-align: center; }
        h1 { color: #22c55e; }
        p { color: #64748b; }
    </style>
</head>
<body>
    <h1>Authorization received</h1>
    <p>You can now close this tab and return to your terminal.</p>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tokio::net::TcpStream;

    #[test]
    fn test_request_target() {
        let request =
            "GET /auth/callback?code=abc123&state=xyz789 HTTP/1.1\r\nHost: localhost:3737\r\n";
        assert_eq!(
            request_target(request),
            Some("/auth/callback?code=abc123&state=xyz789")
        );
        assert_eq!(request_target("POST /auth/callback HTTP/1.1\r\n"), None);
        assert_eq!(request_target(""), None);
    }

    #[rstest]
    #[case("http://localhost:3737/auth/callback", "127.0.0.1", 3737, "/auth/callback")]
    #[case("http://127.0.0.1:8080/cb", "127.0.0.1", 8080, "/cb")]
    #[case("http://localhost/auth/callback", "127.0.0.1", 80, "/auth/callback")]
    fn test_from_redirect_uri(
        #[case] redirect_uri: &str,
        #[case] host: &str,
        #[case] port: u16,
        #[case] path: &str,
    ) {
        let server = CallbackServer::from_redirect_uri(redirect_uri).unwrap();
        assert_eq!(server.host, host);
        assert_eq!(server.port, port);
        assert_eq!(server.path, path);
    }

    #[test]
    fn test_from_redirect_uri_rejects_invalid() {
        assert!(CallbackServer::from_redirect_uri("not a uri").is_err());
    }

    #[test]
    fn test_error_response_escapes_html() {
        let response = error_response("<script>");
        assert!(response.contains("&lt;script&gt;"));
        assert!(response.starts_with("HTTP/1.1 400"));
    }

    async fn send_request(addr: SocketAddr, target: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", target);
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_accept_callback_skips_unrelated_paths() {
        let server = CallbackServer::from_redirect_uri("http://127.0.0.1:0/auth/callback").unwrap();
        let listener = server.listen().await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let favicon = send_request(addr, "/favicon.ico").await;
            let callback = send_request(addr, "/auth/callback?code=abc123&state=xyz789").await;
            (favicon, callback)
        });

        let params = listener.accept_callback().await.unwrap();
        assert_eq!(params.code.as_deref(), Some("abc123"));
        assert_eq!(params.state.as_deref(), Some("xyz789"));

        let (favicon, callback) = client.await.unwrap();
        assert!(favicon.starts_with("HTTP/1.1 404"));
        assert!(callback.starts_with("HTTP/1.1 200"));
    }

    #[tokio::test]
    async fn test_accept_callback_drops_idle_connection() {
        let server = CallbackServer::from_redirect_uri("http://127.0.0.1:0/auth/callback").unwrap();
        let listener = server
            .listen()
            .await
            .unwrap()
            .with_read_timeout(Duration::from_millis(200));
        let addr = listener.local_addr().unwrap();

        // Connected first and never writes
        let _idle = TcpStream::connect(addr).await.unwrap();
        let client = tokio::spawn(async move {
            send_request(addr, "/auth/callback?code=abc123&state=xyz789").await
        });

        let params = timeout(Duration::from_secs(5), listener.accept_callback())
            .await
            .expect("listener stalled on the idle connection")
            .unwrap();
        assert_eq!(params.code.as_deref(), Some("abc123"));
        assert_eq!(params.state.as_deref(), Some("xyz789"));

        let callback = client.await.unwrap();
        assert!(callback.starts_with("HTTP/1.1 200"));
    }
}
