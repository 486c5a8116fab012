//! OCPP-J dispatch engine
//!
//! One [`Session`] drives one transport link: it frames messages through the
//! wire codec, correlates replies to the outstanding CALL via the
//! pending-call table, routes inbound CALLs to the handler bound for the
//! action's profile, and reports protocol faults as CALLERROR frames.
//!
//! Link lifecycle: `Idle → Connecting → Open → Closing → Idle`. Losing the
//! transport cancels the pending call with `SessionClosed` but keeps the
//! registry and handler bindings, so a later `start` is a pure re-attach.
//!
//! One spawned task owns the link and runs the receive loop; outbound CALLs
//! reach it over an mpsc channel, and replies to inbound CALLs are written
//! from inside the loop, which keeps them serialized. The pending slot and
//! link state live behind mutexes that are never held across an await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::{CallFailure, ErrorCode, HandlerFault, TransportError};
use crate::frame::{Call, CallError, CallResult, Frame, WireCodec};
use crate::observer::{ProtocolObserver, TracingObserver};
use crate::pending::{CallOutcome, PendingCall, PendingCalls};
use crate::registry::{FeatureRegistry, Role};
use crate::transport::{Connector, MessageLink};

/// Type-erased inbound router for one profile. Facades adapt their typed
/// handler objects into this; the dispatcher looks routes up by the profile
/// recorded on the feature descriptor.
#[async_trait]
pub trait ProfileRoute: Send + Sync {
    async fn handle(&self, action: &str, payload: Value) -> Result<Value, HandlerFault>;
}

/// Decodes an inbound request payload for a typed handler. The codec has
/// already shape-checked it, so a failure here is an internal fault.
pub fn decode_request<T: DeserializeOwned>(payload: Value) -> Result<T, HandlerFault> {
    serde_json::from_value(payload)
        .map_err(|e| HandlerFault::internal(format!("request payload did not decode: {}", e)))
}

/// Encodes a typed handler response back into a raw payload.
pub fn encode_response<T: Serialize>(response: T) -> Result<Value, HandlerFault> {
    serde_json::to_value(response)
        .map_err(|e| HandlerFault::internal(format!("response payload did not encode: {}", e)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Idle,
    Connecting,
    Open,
    Closing,
}

enum Outbound {
    Frame(String),
    Shutdown,
}

/// One protocol session over one transport link.
pub struct Session {
    shared: Arc<Shared>,
    connector: Box<dyn Connector>,
}

struct Shared {
    role: Role,
    codec: WireCodec,
    config: SessionConfig,
    observer: Arc<dyn ProtocolObserver>,
    routes: RwLock<HashMap<&'static str, Arc<dyn ProfileRoute>>>,
    state: Mutex<LinkState>,
    pending: Mutex<PendingCalls>,
    outgoing: Mutex<Option<mpsc::Sender<Outbound>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Session {
    pub fn new(
        role: Role,
        registry: Arc<FeatureRegistry>,
        connector: Box<dyn Connector>,
        config: SessionConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                role,
                codec: WireCodec::new(registry),
                config,
                observer: Arc::new(TracingObserver),
                routes: RwLock::new(HashMap::new()),
                state: Mutex::new(LinkState::Idle),
                pending: Mutex::new(PendingCalls::new()),
                outgoing: Mutex::new(None),
            }),
            connector,
        }
    }

    /// Replaces the observer. Setup-time only, before `start`/`attach`.
    pub fn with_observer(mut self, observer: Arc<dyn ProtocolObserver>) -> Self {
        match Arc::get_mut(&mut self.shared) {
            Some(shared) => shared.observer = observer,
            None => warn!("observer not replaced: session already shared"),
        }
        self
    }

    pub fn registry(&self) -> &Arc<FeatureRegistry> {
        self.shared.codec.registry()
    }

    pub fn role(&self) -> Role {
        self.shared.role
    }

    pub fn is_open(&self) -> bool {
        *lock(&self.shared.state) == LinkState::Open
    }

    pub fn has_pending(&self) -> bool {
        !lock(&self.shared.pending).is_empty()
    }

    /// Binds the inbound router for a profile. Setup-time only; bindings
    /// survive disconnects.
    pub fn bind_route(&self, profile: &'static str, route: Arc<dyn ProfileRoute>) {
        match self.shared.routes.write() {
            Ok(mut routes) => {
                routes.insert(profile, route);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(profile, route);
            }
        }
    }

    /// Dials the peer and starts the receive loop.
    pub async fn start(&self, url: &str) -> Result<JoinHandle<()>, TransportError> {
        {
            let mut state = lock(&self.shared.state);
            if *state != LinkState::Idle {
                return Err(TransportError::AlreadyOpen);
            }
            *state = LinkState::Connecting;
        }

        let subprotocol = self.shared.codec.registry().version().subprotocol();
        match self.connector.dial(url, subprotocol).await {
            Ok(link) => Ok(self.shared.clone().open(link, url)),
            Err(e) => {
                *lock(&self.shared.state) = LinkState::Idle;
                Err(e)
            }
        }
    }

    /// Adopts an already-connected link (server side) and starts the
    /// receive loop.
    pub fn attach(&self, link: Box<dyn MessageLink>) -> Result<JoinHandle<()>, TransportError> {
        {
            let mut state = lock(&self.shared.state);
            if *state != LinkState::Idle {
                return Err(TransportError::AlreadyOpen);
            }
            *state = LinkState::Connecting;
        }
        Ok(self.shared.clone().open(link, "attached"))
    }

    /// Closes the link. Pending calls resolve with `SessionClosed`;
    /// registry and handler bindings stay for a later `start`.
    pub async fn stop(&self) {
        {
            let mut state = lock(&self.shared.state);
            if *state != LinkState::Open {
                return;
            }
            *state = LinkState::Closing;
        }
        let sender = lock(&self.shared.outgoing).clone();
        if let Some(sender) = sender {
            let _ = sender.send(Outbound::Shutdown).await;
        }
    }

    /// Sends a CALL and waits for the matching reply or the per-call
    /// deadline. Fails fast with `Busy` when a call is already in flight,
    /// before anything touches the transport.
    pub async fn call(&self, action: &str, payload: Value) -> Result<Value, CallFailure> {
        let (message_id, rx) = self.shared.dispatch(action, payload)?;
        self.shared.await_reply(message_id, rx).await
    }

    /// Non-blocking form of [`Session::call`]: preconditions are checked
    /// before returning, completion is delivered to the callback exactly
    /// once.
    pub fn call_with<F>(&self, action: &str, payload: Value, callback: F) -> Result<(), CallFailure>
    where
        F: FnOnce(Result<Value, CallFailure>) + Send + 'static,
    {
        let (message_id, rx) = self.shared.dispatch(action, payload)?;
        let shared = self.shared.clone();
        tokio::spawn(async move {
            callback(shared.await_reply(message_id, rx).await);
        });
        Ok(())
    }

    /// Typed convenience over [`Session::call`] used by the facades.
    pub async fn call_typed<Req, Resp>(&self, action: &str, request: Req) -> Result<Resp, CallFailure>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let payload =
            serde_json::to_value(request).map_err(|e| CallFailure::Encode(e.to_string()))?;
        let raw = self.call(action, payload).await?;
        serde_json::from_value(raw).map_err(|e| CallFailure::Payload(e.to_string()))
    }
}

impl Shared {
    fn open(self: Arc<Self>, link: Box<dyn MessageLink>, endpoint: &str) -> JoinHandle<()> {
        let (sender, receiver) = mpsc::channel(self.config.outgoing_queue);
        *lock(&self.outgoing) = Some(sender);
        *lock(&self.state) = LinkState::Open;
        self.observer.link_opened(endpoint);
        tokio::spawn(async move { self.run_loop(link, receiver).await })
    }

    async fn run_loop(
        self: Arc<Self>,
        mut link: Box<dyn MessageLink>,
        mut outbound: mpsc::Receiver<Outbound>,
    ) {
        let reason = loop {
            tokio::select! {
                queued = outbound.recv() => match queued {
                    Some(Outbound::Frame(text)) => {
                        if let Err(e) = link.send(text).await {
                            break format!("send failed: {}", e);
                        }
                    }
                    Some(Outbound::Shutdown) | None => {
                        link.close().await;
                        break "session stopped".to_string();
                    }
                },
                inbound = link.recv() => match inbound {
                    Some(Ok(text)) => self.handle_frame(&mut link, &text).await,
                    Some(Err(e)) => break format!("receive failed: {}", e),
                    None => break "closed by peer".to_string(),
                },
            }
        };
        self.teardown(&reason);
    }

    fn teardown(&self, reason: &str) {
        *lock(&self.outgoing) = None;
        lock(&self.pending).cancel_all(CallFailure::SessionClosed);
        *lock(&self.state) = LinkState::Idle;
        self.observer.link_closed(reason);
    }

    /// Synchronous part of a send: preconditions, pending registration and
    /// hand-off to the link task.
    fn dispatch(
        &self,
        action: &str,
        payload: Value,
    ) -> Result<(String, oneshot::Receiver<CallOutcome>), CallFailure> {
        if *lock(&self.state) != LinkState::Open {
            return Err(CallFailure::SessionClosed);
        }

        let descriptor = self
            .codec
            .registry()
            .lookup(action)
            .ok_or_else(|| CallFailure::FeatureNotSupported(action.to_string()))?;
        if !descriptor.direction.sendable_by(self.role) {
            return Err(CallFailure::FeatureNotSupported(action.to_string()));
        }

        let message_id = Uuid::new_v4().to_string();
        let (sink, rx) = oneshot::channel();
        lock(&self.pending).add(PendingCall::new(
            message_id.clone(),
            descriptor.action,
            sink,
        ))?;

        let text = self.codec.encode_call(&Call {
            message_id: message_id.clone(),
            action: action.to_string(),
            payload,
        });
        let sender = lock(&self.outgoing).clone();
        let enqueued = match &sender {
            Some(tx) => tx.try_send(Outbound::Frame(text)).is_ok(),
            None => false,
        };
        if !enqueued {
            lock(&self.pending).fail(&message_id, CallFailure::SessionClosed);
            return Err(CallFailure::SessionClosed);
        }

        self.observer.call_sent(action, &message_id);
        Ok((message_id, rx))
    }

    async fn await_reply(
        &self,
        message_id: String,
        mut rx: oneshot::Receiver<CallOutcome>,
    ) -> Result<Value, CallFailure> {
        match tokio::time::timeout(self.config.call_timeout, &mut rx).await {
            Ok(Ok(outcome)) => outcome,
            // Sink dropped without resolving; only possible when the loop
            // task died, which counts as a closed session.
            Ok(Err(_)) => Err(CallFailure::SessionClosed),
            Err(_) => {
                if lock(&self.pending).fail(&message_id, CallFailure::Timeout) {
                    self.observer.call_timed_out(&message_id);
                }
                // Either the Timeout just delivered, or a reply that won
                // the race against the deadline.
                match rx.try_recv() {
                    Ok(outcome) => outcome,
                    Err(_) => Err(CallFailure::Timeout),
                }
            }
        }
    }

    async fn handle_frame(&self, link: &mut Box<dyn MessageLink>, text: &str) {
        match self.codec.decode(text) {
            Ok(Frame::Call(call)) => self.handle_call(link, call).await,
            Ok(Frame::CallResult(result)) => self.handle_result(result),
            Ok(Frame::CallError(error)) => self.handle_call_error(error),
            Err(fault) => {
                self.observer.decode_rejected(&fault.description);
                // Without a trustworthy message id no CALLERROR can be
                // formed; the frame is dropped.
                if let Some(message_id) = fault.message_id {
                    self.reply_error(
                        link,
                        CallError::new(message_id, fault.code, fault.description),
                    )
                    .await;
                }
            }
        }
    }

    async fn handle_call(&self, link: &mut Box<dyn MessageLink>, call: Call) {
        self.observer.call_received(&call.action, &call.message_id);

        if *lock(&self.state) == LinkState::Closing {
            self.reply_error(
                link,
                CallError::new(
                    call.message_id,
                    ErrorCode::InternalError,
                    "session is shutting down",
                ),
            )
            .await;
            return;
        }

        let descriptor = match self.codec.registry().lookup(&call.action) {
            Some(descriptor) => *descriptor,
            None => {
                self.reply_error(
                    link,
                    CallError::new(
                        call.message_id,
                        ErrorCode::NotImplemented,
                        format!("no handler for action {} implemented", call.action),
                    ),
                )
                .await;
                return;
            }
        };

        if !descriptor.direction.receivable_by(self.role) {
            self.reply_error(
                link,
                CallError::new(
                    call.message_id,
                    ErrorCode::NotSupported,
                    format!("action {} cannot target this endpoint", call.action),
                ),
            )
            .await;
            return;
        }

        let route = match self.routes.read() {
            Ok(routes) => routes.get(descriptor.profile).cloned(),
            Err(poisoned) => poisoned.into_inner().get(descriptor.profile).cloned(),
        };
        let route = match route {
            Some(route) => route,
            None => {
                self.reply_error(
                    link,
                    CallError::new(
                        call.message_id,
                        ErrorCode::NotSupported,
                        format!("unsupported action {} on this endpoint", call.action),
                    ),
                )
                .await;
                return;
            }
        };

        match route.handle(&call.action, call.payload).await {
            Ok(payload) => {
                if let Err(fault) = descriptor.response.check(&payload) {
                    self.reply_error(
                        link,
                        CallError::new(
                            call.message_id,
                            ErrorCode::InternalError,
                            format!("handler produced an invalid response: {}", fault),
                        ),
                    )
                    .await;
                    return;
                }
                let result = CallResult {
                    message_id: call.message_id,
                    payload,
                };
                self.send_on_link(link, self.codec.encode_result(&result)).await;
                self.observer.result_sent(&result.message_id);
            }
            Err(fault) => {
                self.reply_error(
                    link,
                    CallError {
                        message_id: call.message_id,
                        code: fault.code,
                        description: fault.description,
                        details: fault.details,
                    },
                )
                .await;
            }
        }
    }

    fn handle_result(&self, result: CallResult) {
        let mut pending = lock(&self.pending);
        match pending.action_of(&result.message_id) {
            None => {
                drop(pending);
                self.observer.stray_reply(&result.message_id);
            }
            Some(action) => match self.codec.check_response(action, &result.payload) {
                Ok(()) => {
                    pending.resolve(&result.message_id, result.payload);
                }
                Err(fault) => {
                    pending.fail(&result.message_id, CallFailure::Payload(fault.to_string()));
                }
            },
        }
    }

    fn handle_call_error(&self, error: CallError) {
        let failure = CallFailure::Peer {
            code: error.code,
            description: error.description,
            details: error.details,
        };
        if !lock(&self.pending).fail(&error.message_id, failure) {
            self.observer.stray_reply(&error.message_id);
        }
    }

    async fn reply_error(&self, link: &mut Box<dyn MessageLink>, error: CallError) {
        self.observer.error_sent(&error.message_id, error.code);
        self.send_on_link(link, self.codec.encode_error(&error)).await;
    }

    async fn send_on_link(&self, link: &mut Box<dyn MessageLink>, text: String) {
        if let Err(e) = link.send(text).await {
            warn!(error = %e, "failed to write reply; the link is going down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Direction, FeatureDescriptor, ProtocolVersion};
    use crate::transport::{memory_link_pair, MemoryConnector, MemoryLink, NullConnector};
    use crate::validation::Validate;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct PingRequest {}
    impl Validate for PingRequest {}

    #[derive(Debug, Serialize, Deserialize)]
    struct PingResponse {
        ok: bool,
    }
    impl Validate for PingResponse {}

    fn test_registry() -> Arc<FeatureRegistry> {
        let mut registry = FeatureRegistry::new(ProtocolVersion::V16);
        registry
            .register(FeatureDescriptor::new::<PingRequest, PingResponse>(
                "Ping",
                "Core",
                ProtocolVersion::V16,
                Direction::Both,
            ))
            .expect("fresh registry");
        Arc::new(registry)
    }

    fn session_with_link() -> (Session, MemoryLink) {
        let (near, far) = memory_link_pair();
        let connector = MemoryConnector::new();
        connector.provide(near);
        let session = Session::new(
            Role::ChargingStation,
            test_registry(),
            Box::new(connector),
            SessionConfig::default(),
        );
        (session, far)
    }

    #[tokio::test]
    async fn call_requires_open_session() {
        let session = Session::new(
            Role::ChargingStation,
            test_registry(),
            Box::new(NullConnector),
            SessionConfig::default(),
        );
        let err = session.call("Ping", json!({})).await.unwrap_err();
        assert!(matches!(err, CallFailure::SessionClosed));
    }

    #[tokio::test]
    async fn unknown_action_fails_before_the_wire() {
        let (session, _far) = session_with_link();
        session.start("mem://test").await.unwrap();

        let err = session.call("Nope", json!({})).await.unwrap_err();
        assert!(matches!(err, CallFailure::FeatureNotSupported(_)));
    }

    #[tokio::test]
    async fn call_resolves_on_matching_result() {
        let (session, mut far) = session_with_link();
        session.start("mem://test").await.unwrap();

        let handle = tokio::spawn(async move {
            let text = far.recv().await.unwrap().unwrap();
            let outer: Vec<Value> = serde_json::from_str(&text).unwrap();
            let message_id = outer[1].as_str().unwrap();
            far.send(format!(r#"[3,"{}",{{"ok":true}}]"#, message_id))
                .await
                .unwrap();
            far
        });

        let response = session.call("Ping", json!({})).await.unwrap();
        assert_eq!(response, json!({"ok": true}));
        assert!(!session.has_pending());
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn peer_error_surfaces_as_failure() {
        let (session, mut far) = session_with_link();
        session.start("mem://test").await.unwrap();

        tokio::spawn(async move {
            let text = far.recv().await.unwrap().unwrap();
            let outer: Vec<Value> = serde_json::from_str(&text).unwrap();
            let message_id = outer[1].as_str().unwrap();
            far.send(format!(
                r#"[4,"{}","GenericError","nope",{{}}]"#,
                message_id
            ))
            .await
            .unwrap();
            // Keep the link alive until the reply is consumed.
            let _ = far.recv().await;
        });

        let err = session.call("Ping", json!({})).await.unwrap_err();
        match err {
            CallFailure::Peer { code, .. } => assert_eq!(code, ErrorCode::GenericError),
            other => panic!("expected Peer failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_cancels() {
        let (session, _far) = session_with_link();
        session.start("mem://test").await.unwrap();
        assert!(session.is_open());

        session.stop().await;
        session.stop().await;

        // The loop drains asynchronously; wait for the state to settle.
        for _ in 0..50 {
            if !session.is_open() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(!session.is_open());
        assert!(!session.has_pending());
    }
}
