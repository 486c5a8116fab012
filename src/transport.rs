//! Transport collaborator
//!
//! The engine treats the transport as a message-framed duplex link with
//! connect/disconnect events ([`MessageLink`]) plus a way to establish one
//! ([`Connector`]). The default implementation speaks WebSocket via
//! tokio-tungstenite; an in-memory pair backs tests and examples.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    accept_hdr_async_with_config, connect_async_with_config,
    tungstenite::{
        handshake::client::Request,
        handshake::server,
        http::{header, HeaderValue, Uri},
        protocol::WebSocketConfig,
        Message,
    },
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, warn};

use crate::error::TransportError;

/// A connected, message-framed duplex link carrying OCPP-J text frames.
#[async_trait]
pub trait MessageLink: Send {
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Next inbound text frame. `None` means the peer closed the link.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    async fn close(&mut self);
}

/// Establishes a [`MessageLink`] to a peer. Injected into the engine so
/// tests can substitute an in-memory pair.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn dial(
        &self,
        url: &str,
        subprotocol: &'static str,
    ) -> Result<Box<dyn MessageLink>, TransportError>;
}

// ---------------------------------------------------------------------------
// WebSocket
// ---------------------------------------------------------------------------

/// WebSocket link over any async byte stream (client or accepted server
/// side).
pub struct WsLink<S> {
    inner: WebSocketStream<S>,
}

#[async_trait]
impl<S> MessageLink for WsLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.inner.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text)),
                Some(Ok(Message::Close(_))) => return None,
                Some(Ok(Message::Binary(_))) => {
                    warn!("ignoring binary frame on OCPP-J link");
                }
                // Ping/pong is answered by tungstenite itself.
                Some(Ok(_)) => {}
                Some(Err(e)) => return Some(Err(e.into())),
                None => return None,
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.inner.close(None).await;
    }
}

/// Dials a CSMS over WebSocket with the OCPP subprotocol header set.
#[derive(Debug, Clone)]
pub struct WsConnector {
    pub max_message_size: usize,
    pub max_frame_size: usize,
}

impl Default for WsConnector {
    fn default() -> Self {
        Self {
            max_message_size: 64 * 1024,
            max_frame_size: 16 * 1024,
        }
    }
}

impl WsConnector {
    pub fn new(max_message_size: usize, max_frame_size: usize) -> Self {
        Self {
            max_message_size,
            max_frame_size,
        }
    }

    fn ws_config(&self) -> WebSocketConfig {
        WebSocketConfig {
            max_message_size: Some(self.max_message_size),
            max_frame_size: Some(self.max_frame_size),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn dial(
        &self,
        url: &str,
        subprotocol: &'static str,
    ) -> Result<Box<dyn MessageLink>, TransportError> {
        let uri: Uri = url
            .parse()
            .map_err(|_| TransportError::BadUrl(url.to_string()))?;

        let request = Request::builder()
            .uri(url)
            .header(header::SEC_WEBSOCKET_PROTOCOL, subprotocol)
            .header(header::HOST, uri.host().unwrap_or("localhost"))
            .body(())
            .map_err(|e| TransportError::Handshake(e.to_string()))?;

        let (stream, response) =
            connect_async_with_config(request, Some(self.ws_config()), false).await?;

        let accepted = response
            .headers()
            .get(header::SEC_WEBSOCKET_PROTOCOL)
            .and_then(|v| v.to_str().ok());
        if accepted != Some(subprotocol) {
            warn!(
                requested = subprotocol,
                accepted = ?accepted,
                "server did not confirm the OCPP subprotocol"
            );
        }

        debug!(url, "websocket connected");
        Ok(Box::new(WsLink { inner: stream }))
    }
}

/// Result of a server-side OCPP handshake.
pub struct AcceptedLink {
    pub link: WsLink<TcpStream>,
    /// Request path, carrying the station id as its last segment.
    pub path: String,
    /// Subprotocol confirmed to the client, if any matched.
    pub subprotocol: Option<String>,
}

/// Accepts one inbound WebSocket connection, confirming `subprotocol` when
/// the client offers it and capturing the request path.
pub async fn accept_ocpp(
    stream: TcpStream,
    subprotocol: &'static str,
    max_message_size: usize,
    max_frame_size: usize,
) -> Result<AcceptedLink, TransportError> {
    let mut path = String::new();
    let mut chosen: Option<String> = None;

    let config = WebSocketConfig {
        max_message_size: Some(max_message_size),
        max_frame_size: Some(max_frame_size),
        ..Default::default()
    };

    let callback = |req: &server::Request, mut resp: server::Response| {
        path = req.uri().path().to_string();
        let offered = req
            .headers()
            .get(header::SEC_WEBSOCKET_PROTOCOL)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if offered.split(',').map(str::trim).any(|p| p == subprotocol) {
            resp.headers_mut().insert(
                header::SEC_WEBSOCKET_PROTOCOL,
                HeaderValue::from_static(subprotocol),
            );
            chosen = Some(subprotocol.to_string());
        } else {
            warn!(offered, expected = subprotocol, "client offered no matching OCPP subprotocol");
        }
        Ok(resp)
    };

    let inner = accept_hdr_async_with_config(stream, callback, Some(config)).await?;

    Ok(AcceptedLink {
        link: WsLink { inner },
        path,
        subprotocol: chosen,
    })
}

/// Station id carried as the last segment of the connection path.
pub fn station_id_from_path(path: &str) -> Option<&str> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// In-memory link
// ---------------------------------------------------------------------------

/// In-memory [`MessageLink`]; the two halves of a pair are cross-wired.
/// Backs the integration tests and local demos.
pub struct MemoryLink {
    tx: Option<mpsc::Sender<String>>,
    rx: mpsc::Receiver<String>,
}

/// Builds a connected pair of in-memory links.
pub fn memory_link_pair() -> (MemoryLink, MemoryLink) {
    let (a_tx, a_rx) = mpsc::channel(64);
    let (b_tx, b_rx) = mpsc::channel(64);
    (
        MemoryLink {
            tx: Some(a_tx),
            rx: b_rx,
        },
        MemoryLink {
            tx: Some(b_tx),
            rx: a_rx,
        },
    )
}

#[async_trait]
impl MessageLink for MemoryLink {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        match &self.tx {
            Some(tx) => tx.send(text).await.map_err(|_| TransportError::Closed),
            None => Err(TransportError::Closed),
        }
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        self.rx.recv().await.map(Ok)
    }

    async fn close(&mut self) {
        self.tx = None;
        self.rx.close();
    }
}

/// Connector handing out pre-staged [`MemoryLink`]s, one per dial.
#[derive(Default)]
pub struct MemoryConnector {
    staged: Mutex<VecDeque<MemoryLink>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provide(&self, link: MemoryLink) {
        if let Ok(mut staged) = self.staged.lock() {
            staged.push_back(link);
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn dial(
        &self,
        _url: &str,
        _subprotocol: &'static str,
    ) -> Result<Box<dyn MessageLink>, TransportError> {
        let link = self
            .staged
            .lock()
            .ok()
            .and_then(|mut staged| staged.pop_front());
        match link {
            Some(link) => Ok(Box::new(link)),
            None => Err(TransportError::Handshake("no staged link".to_string())),
        }
    }
}

/// Connector for server-side sessions, which never dial.
#[derive(Debug, Default)]
pub struct NullConnector;

#[async_trait]
impl Connector for NullConnector {
    async fn dial(
        &self,
        _url: &str,
        _subprotocol: &'static str,
    ) -> Result<Box<dyn MessageLink>, TransportError> {
        Err(TransportError::Handshake(
            "server-side sessions do not dial".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_id_comes_from_last_path_segment() {
        assert_eq!(station_id_from_path("/ocpp/CS001"), Some("CS001"));
        assert_eq!(station_id_from_path("/ocpp/CS001/"), Some("CS001"));
        assert_eq!(station_id_from_path("/CS001"), Some("CS001"));
        assert_eq!(station_id_from_path("/"), None);
        assert_eq!(station_id_from_path(""), None);
    }

    #[tokio::test]
    async fn memory_pair_is_cross_wired() {
        let (mut a, mut b) = memory_link_pair();
        a.send("hello".to_string()).await.unwrap();
        assert_eq!(b.recv().await.unwrap().unwrap(), "hello");

        b.send("world".to_string()).await.unwrap();
        assert_eq!(a.recv().await.unwrap().unwrap(), "world");
    }

    #[tokio::test]
    async fn closing_one_half_ends_the_other() {
        let (mut a, mut b) = memory_link_pair();
        a.close().await;
        assert!(b.recv().await.is_none());
        assert!(matches!(b.send("x".into()).await, Err(TransportError::Closed)));
    }
}
