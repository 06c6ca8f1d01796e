//! Gateway session (shard)
//!
//! One shard owns one live WebSocket connection and is the sole reader of
//! it. A second task beats the heart; socket writes from either task go
//! through a single-writer mutex so frames never interleave.

use crate::error::{GatewayError, GatewayResult};
use crate::events::{Event, EventKind};
use crate::protocol::{
    Hello, Identify, IdentifyProperties, InboundFrame, OpCode, OutboundFrame, Ready, Resume,
    API_VERSION,
};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use ripcord_cache::Store;
use ripcord_core::{Guild, Message, Presence, Snowflake};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Index of a shard within the cluster; also the non-owning handle shards
/// stamp onto the events they emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardId(pub u32);

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Opening the socket
    Connecting,
    /// Socket open, waiting for the Hello frame
    AwaitingHello,
    /// Identify sent, waiting for READY
    Identifying,
    /// Receiving dispatches
    Active,
    /// Connection lost, resume in progress
    Reconnecting,
    /// Session over
    Disconnected,
}

/// Everything a shard needs to run one session
#[derive(Debug, Clone)]
pub struct ShardConfig {
    pub token: String,
    /// Gateway URL without the version/encoding query
    pub gateway_url: String,
    pub shard_id: ShardId,
    pub total_shards: u32,
    pub presence: Presence,
    pub large_threshold: u32,
    pub properties: IdentifyProperties,
}

/// What the receive loop should do after a frame
#[derive(Debug, PartialEq, Eq)]
enum FrameAction {
    Continue,
    Reconnect,
}

/// One gateway connection and its session state.
///
/// The orchestrator owns the shard; the shard only knows its own id.
pub struct Shard {
    config: ShardConfig,
    state: RwLock<SessionState>,

    /// Last sequence seen, non-decreasing; reset only by a fresh identify
    sequence: AtomicU64,
    /// Server-issued resume token; survives reconnects, discarded on identify
    session_id: RwLock<Option<String>>,

    heartbeat_acked: AtomicBool,
    last_heartbeat_sent: parking_lot::Mutex<Option<Instant>>,
    latency_ms: AtomicU64,
    heartbeat_task: Mutex<Option<JoinHandle<()>>>,

    /// Write half of the socket; both loops send through this lock
    writer: Mutex<Option<WsSink>>,
    /// Set by the heartbeat loop before force-closing the socket
    reconnect_requested: AtomicBool,
    closed: AtomicBool,

    guilds: Arc<Store<Snowflake, Guild>>,
    unavailable_guilds: AtomicUsize,
    events_tx: mpsc::UnboundedSender<Event>,
}

impl Shard {
    /// Create a shard; it does nothing until [`Shard::run`] is awaited
    pub fn new(config: ShardConfig, events_tx: mpsc::UnboundedSender<Event>) -> Arc<Self> {
        Arc::new(Self {
            config,
            state: RwLock::new(SessionState::Connecting),
            sequence: AtomicU64::new(0),
            session_id: RwLock::new(None),
            heartbeat_acked: AtomicBool::new(true),
            last_heartbeat_sent: parking_lot::Mutex::new(None),
            latency_ms: AtomicU64::new(0),
            heartbeat_task: Mutex::new(None),
            writer: Mutex::new(None),
            reconnect_requested: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            guilds: Store::new(0),
            unavailable_guilds: AtomicUsize::new(0),
            events_tx,
        })
    }

    /// This shard's id
    pub fn id(&self) -> ShardId {
        self.config.shard_id
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Last sequence number seen on this session
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// The resume token, once READY has delivered one
    pub fn session_id(&self) -> Option<String> {
        self.session_id.read().clone()
    }

    /// Heartbeat round-trip measured at the last acknowledgment
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms.load(Ordering::SeqCst))
    }

    /// Guilds this shard has seen
    pub fn guilds(&self) -> &Arc<Store<Snowflake, Guild>> {
        &self.guilds
    }

    /// Number of cached guilds
    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    /// Guilds that were unavailable at READY
    pub fn unavailable_guild_count(&self) -> usize {
        self.unavailable_guilds.load(Ordering::SeqCst)
    }

    /// Run the session until it ends.
    ///
    /// A clean end-of-stream (or a [`Shard::close`] call) returns `Ok`;
    /// anything the session cannot recover from via resume surfaces as the
    /// terminal error.
    pub async fn run(self: Arc<Self>) -> GatewayResult<()> {
        let mut reader = match self.establish().await {
            Ok(reader) => reader,
            Err(err) => {
                self.shutdown().await;
                return Err(err);
            }
        };

        let result = self.receive_loop(&mut reader).await;
        self.shutdown().await;
        result
    }

    async fn receive_loop(self: &Arc<Self>, reader: &mut WsReader) -> GatewayResult<()> {
        loop {
            match reader.next().await {
                Some(Ok(WsMessage::Text(text))) => match self.handle_frame(&text).await? {
                    FrameAction::Continue => {}
                    FrameAction::Reconnect => *reader = self.reconnect().await?,
                },
                Some(Ok(WsMessage::Close(_))) | None => {
                    if self.closed.load(Ordering::SeqCst) {
                        return Ok(());
                    }
                    if self.reconnect_requested.swap(false, Ordering::SeqCst) {
                        *reader = self.reconnect().await?;
                        continue;
                    }
                    tracing::info!(shard_id = %self.config.shard_id, "Gateway stream ended cleanly");
                    return Ok(());
                }
                Some(Ok(_)) => {} // ping/pong/binary frames carry no envelopes
                Some(Err(err)) => {
                    if self.closed.load(Ordering::SeqCst) {
                        return Ok(());
                    }
                    tracing::warn!(
                        shard_id = %self.config.shard_id,
                        error = %err,
                        "Transport error, attempting to resume"
                    );
                    *reader = self.reconnect().await?;
                }
            }
        }
    }

    /// Fresh connect: socket → Hello → heartbeat loop → identify
    async fn establish(self: &Arc<Self>) -> GatewayResult<WsReader> {
        self.set_state(SessionState::Connecting);
        let mut reader = self.open_socket().await?;
        let hello = self.await_hello(&mut reader).await?;
        self.set_state(SessionState::Identifying);
        self.start_heartbeat(Duration::from_millis(hello.heartbeat_interval))
            .await;
        self.send_identify().await?;
        Ok(reader)
    }

    /// Fresh socket, then resume if we hold a session token, else a new
    /// identify. The heartbeat loop is restarted exactly once per
    /// reconnect.
    async fn reconnect(self: &Arc<Self>) -> GatewayResult<WsReader> {
        self.set_state(SessionState::Reconnecting);
        self.stop_heartbeat().await;

        let mut reader = self.open_socket().await?;
        let hello = self.await_hello(&mut reader).await?;

        let session = self.session_id.read().clone();
        match session {
            Some(session_id) => {
                tracing::info!(
                    shard_id = %self.config.shard_id,
                    sequence = self.sequence(),
                    "Resuming session"
                );
                self.send_resume(&session_id).await?;
                self.set_state(SessionState::Active);
            }
            None => {
                tracing::info!(shard_id = %self.config.shard_id, "No resumable session, identifying");
                self.set_state(SessionState::Identifying);
                self.send_identify().await?;
            }
        }

        self.start_heartbeat(Duration::from_millis(hello.heartbeat_interval))
            .await;
        Ok(reader)
    }

    async fn open_socket(&self) -> GatewayResult<WsReader> {
        let url = format!(
            "{}?v={}&encoding=json",
            self.config.gateway_url, API_VERSION
        );
        let (stream, _) = connect_async(url).await?;
        let (sink, reader) = stream.split();
        *self.writer.lock().await = Some(sink);
        self.set_state(SessionState::AwaitingHello);
        Ok(reader)
    }

    /// During the opening handshake every problem is fatal
    async fn await_hello(&self, reader: &mut WsReader) -> GatewayResult<Hello> {
        loop {
            match reader.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    let frame = InboundFrame::from_json(&text).map_err(|err| {
                        GatewayError::Handshake(format!("malformed envelope before hello: {err}"))
                    })?;
                    if frame.op != OpCode::Hello {
                        return Err(GatewayError::Handshake(format!("expected hello, got {frame}")));
                    }
                    let hello = frame.as_hello().ok_or_else(|| {
                        GatewayError::Handshake("hello payload missing heartbeat interval".to_string())
                    })?;
                    tracing::debug!(
                        shard_id = %self.config.shard_id,
                        heartbeat_interval_ms = hello.heartbeat_interval,
                        "Hello received"
                    );
                    return Ok(hello);
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    return Err(GatewayError::Handshake("stream ended before hello".to_string()));
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(GatewayError::Transport(err)),
            }
        }
    }

    async fn handle_frame(self: &Arc<Self>, text: &str) -> GatewayResult<FrameAction> {
        let frame = match InboundFrame::from_json(text) {
            Ok(frame) => frame,
            Err(err) => {
                // malformed envelopes are fatal only while the handshake
                // is still in flight
                if self.state() == SessionState::Identifying {
                    return Err(GatewayError::Handshake(format!("malformed envelope: {err}")));
                }
                tracing::warn!(
                    shard_id = %self.config.shard_id,
                    error = %err,
                    "Dropping malformed envelope"
                );
                return Ok(FrameAction::Continue);
            }
        };

        // the sequence only ever advances, and only from payload data
        if let Some(s) = frame.s {
            self.sequence.fetch_max(s, Ordering::SeqCst);
        }

        match frame.op {
            OpCode::Dispatch => {
                self.handle_dispatch(frame.t.as_deref(), frame.d)?;
                Ok(FrameAction::Continue)
            }
            OpCode::HeartbeatAck => {
                if let Some(sent_at) = *self.last_heartbeat_sent.lock() {
                    let latency = sent_at.elapsed();
                    self.latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
                    tracing::trace!(
                        shard_id = %self.config.shard_id,
                        latency_ms = latency.as_millis() as u64,
                        "Heartbeat acknowledged"
                    );
                }
                self.heartbeat_acked.store(true, Ordering::SeqCst);
                Ok(FrameAction::Continue)
            }
            OpCode::Heartbeat => {
                // server asked for an immediate beat
                if let Err(err) = self.send_heartbeat().await {
                    tracing::warn!(shard_id = %self.config.shard_id, error = %err, "Requested heartbeat failed");
                }
                Ok(FrameAction::Continue)
            }
            OpCode::Reconnect => {
                tracing::info!(shard_id = %self.config.shard_id, "Server requested reconnect");
                Ok(FrameAction::Reconnect)
            }
            OpCode::InvalidSession => {
                if !frame.invalid_session_resumable() {
                    *self.session_id.write() = None;
                }
                tracing::warn!(
                    shard_id = %self.config.shard_id,
                    resumable = frame.invalid_session_resumable(),
                    "Session invalidated"
                );
                Ok(FrameAction::Reconnect)
            }
            OpCode::Hello | OpCode::Identify | OpCode::StatusUpdate | OpCode::Resume => {
                tracing::trace!(shard_id = %self.config.shard_id, op = %frame.op, "Ignoring unexpected frame");
                Ok(FrameAction::Continue)
            }
        }
    }

    fn handle_dispatch(&self, name: Option<&str>, data: Option<Value>) -> GatewayResult<()> {
        let Some(name) = name else {
            tracing::warn!(shard_id = %self.config.shard_id, "Dispatch without an event name");
            return Ok(());
        };

        match EventKind::parse(name) {
            Some(EventKind::Ready) => {
                let ready: Ready = serde_json::from_value(data.unwrap_or(Value::Null))
                    .map_err(|err| GatewayError::Handshake(format!("malformed READY payload: {err}")))?;

                let mut unavailable = 0;
                for guild in ready.guilds {
                    if guild.unavailable {
                        unavailable += 1;
                    }
                    self.guilds.add(guild.id, guild);
                }
                self.unavailable_guilds.store(unavailable, Ordering::SeqCst);
                *self.session_id.write() = Some(ready.session_id);
                self.set_state(SessionState::Active);

                tracing::info!(
                    shard_id = %self.config.shard_id,
                    guilds = self.guilds.len(),
                    unavailable,
                    "Session ready"
                );
                self.emit(Event::Ready {
                    shard_id: self.config.shard_id,
                });
            }
            Some(EventKind::GuildCreate) => {
                let guild: Guild = match serde_json::from_value(data.unwrap_or(Value::Null)) {
                    Ok(guild) => guild,
                    Err(err) => {
                        tracing::warn!(shard_id = %self.config.shard_id, error = %err, "Dropping malformed GUILD_CREATE");
                        return Ok(());
                    }
                };

                if self.guilds.has(&guild.id) {
                    // lazy load of a guild announced at READY, not news
                    tracing::debug!(shard_id = %self.config.shard_id, guild = %guild, "Lazy loaded guild");
                    self.guilds.update(guild.id, guild);
                } else {
                    self.guilds.add(guild.id, guild.clone());
                    self.emit(Event::GuildCreate {
                        shard_id: self.config.shard_id,
                        guild,
                    });
                }
            }
            Some(EventKind::MessageCreate) => {
                let message: Message = match serde_json::from_value(data.unwrap_or(Value::Null)) {
                    Ok(message) => message,
                    Err(err) => {
                        tracing::warn!(shard_id = %self.config.shard_id, error = %err, "Dropping malformed MESSAGE_CREATE");
                        return Ok(());
                    }
                };
                self.emit(Event::MessageCreate {
                    shard_id: self.config.shard_id,
                    message,
                });
            }
            None => {
                tracing::trace!(shard_id = %self.config.shard_id, event = name, "Ignoring unrecognized dispatch");
            }
        }
        Ok(())
    }

    /// Update this shard's presence
    pub async fn update_presence(&self, presence: &Presence) -> GatewayResult<()> {
        self.send_frame(&OutboundFrame::status_update(presence)?).await
    }

    /// Update the presence to "Playing `name`"
    pub async fn update_game(&self, name: &str) -> GatewayResult<()> {
        self.update_presence(&Presence::playing(name)).await
    }

    /// Close the session: stops the heartbeat loop and releases the
    /// socket. Idempotent, and safe to call while the loops are running.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.stop_heartbeat().await;
        if let Some(mut sink) = self.writer.lock().await.take() {
            let _ = sink.close().await;
        }
        self.set_state(SessionState::Disconnected);
        tracing::info!(shard_id = %self.config.shard_id, "Session closed");
    }

    async fn shutdown(&self) {
        self.stop_heartbeat().await;
        if let Some(mut sink) = self.writer.lock().await.take() {
            let _ = sink.close().await;
        }
        self.set_state(SessionState::Disconnected);
    }

    /// One heartbeat-loop tick. Returns false when the loop should stop.
    async fn heartbeat_tick(self: &Arc<Self>) -> bool {
        if !self.heartbeat_acked.load(Ordering::SeqCst) {
            // never send a second unacknowledged heartbeat; force-close
            // and let the receive loop resume the session
            tracing::warn!(
                shard_id = %self.config.shard_id,
                "Heartbeat not acknowledged, closing connection for resume"
            );
            self.reconnect_requested.store(true, Ordering::SeqCst);
            if let Some(mut sink) = self.writer.lock().await.take() {
                let _ = sink.close().await;
            }
            return false;
        }

        if let Err(err) = self.send_heartbeat().await {
            tracing::debug!(
                shard_id = %self.config.shard_id,
                error = %err,
                "Heartbeat send failed, leaving recovery to the receive loop"
            );
            return false;
        }
        true
    }

    async fn send_heartbeat(&self) -> GatewayResult<()> {
        let frame = OutboundFrame::heartbeat(self.sequence());
        self.send_frame(&frame).await?;
        self.heartbeat_acked.store(false, Ordering::SeqCst);
        *self.last_heartbeat_sent.lock() = Some(Instant::now());
        tracing::trace!(shard_id = %self.config.shard_id, sequence = self.sequence(), "Heartbeat sent");
        Ok(())
    }

    /// A fresh identify discards the session token and resets the
    /// sequence; the server's first dispatch re-seeds it
    async fn send_identify(&self) -> GatewayResult<()> {
        self.sequence.store(0, Ordering::SeqCst);
        *self.session_id.write() = None;

        let identify = Identify {
            token: self.config.token.clone(),
            properties: self.config.properties.clone(),
            shard: [self.config.shard_id.0, self.config.total_shards],
            presence: self.config.presence.clone(),
            large_threshold: self.config.large_threshold,
        };
        self.send_frame(&OutboundFrame::identify(&identify)?).await
    }

    async fn send_resume(&self, session_id: &str) -> GatewayResult<()> {
        let resume = Resume {
            token: self.config.token.clone(),
            sequence: self.sequence(),
            session_id: session_id.to_string(),
        };
        self.send_frame(&OutboundFrame::resume(&resume)?).await
    }

    /// Single-writer socket send; both loops funnel through here
    async fn send_frame(&self, frame: &OutboundFrame) -> GatewayResult<()> {
        let json = frame.to_json()?;
        let mut writer = self.writer.lock().await;
        let sink = writer.as_mut().ok_or(GatewayError::Closed)?;
        sink.send(WsMessage::Text(json)).await?;
        Ok(())
    }

    async fn start_heartbeat(self: &Arc<Self>, interval: Duration) {
        self.stop_heartbeat().await;
        self.heartbeat_acked.store(true, Ordering::SeqCst);

        let shard = Arc::clone(self);
        let handle = tokio::spawn(async move {
            // the first tick completes immediately, so the loop beats
            // once up front and then every interval
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if !shard.heartbeat_tick().await {
                    break;
                }
            }
        });
        *self.heartbeat_task.lock().await = Some(handle);
    }

    async fn stop_heartbeat(&self) {
        if let Some(handle) = self.heartbeat_task.lock().await.take() {
            handle.abort();
        }
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write() = state;
    }

    fn emit(&self, event: Event) {
        // a gone cluster just means nobody is listening anymore
        let _ = self.events_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_tungstenite::accept_async;

    fn shard_for(gateway_url: &str) -> (Arc<Shard>, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shard = Shard::new(
            ShardConfig {
                token: "token".to_string(),
                gateway_url: gateway_url.to_string(),
                shard_id: ShardId(0),
                total_shards: 1,
                presence: Presence::default(),
                large_threshold: 250,
                properties: IdentifyProperties::default(),
            },
            tx,
        );
        (shard, rx)
    }

    fn test_shard() -> (Arc<Shard>, mpsc::UnboundedReceiver<Event>) {
        shard_for("wss://gateway.invalid")
    }

    fn hello(heartbeat_interval: u64) -> WsMessage {
        WsMessage::Text(format!(
            r#"{{"op": 10, "d": {{"heartbeat_interval": {heartbeat_interval}, "_trace": []}}}}"#
        ))
    }

    /// Read server-side frames until one with the given opcode arrives
    async fn read_op(ws: &mut WebSocketStream<TcpStream>, op: u8) -> Value {
        loop {
            match ws.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    let frame: Value = serde_json::from_str(&text).unwrap();
                    if frame["op"] == op {
                        return frame;
                    }
                }
                Some(Ok(_)) => {}
                other => panic!("stream ended waiting for op {op}: {other:?}"),
            }
        }
    }

    const READY: &str = r#"{
        "op": 0, "t": "READY", "s": 1,
        "d": {
            "v": 6,
            "user": {"id": "1", "username": "bot", "discriminator": "0001", "bot": true},
            "guilds": [
                {"id": "41771983423143937", "unavailable": true},
                {"id": "41771983423143938", "name": "lounge"}
            ],
            "session_id": "abcdef"
        }
    }"#;

    #[tokio::test]
    async fn test_new_shard_defaults() {
        let (shard, _rx) = test_shard();
        assert_eq!(shard.state(), SessionState::Connecting);
        assert_eq!(shard.sequence(), 0);
        assert!(shard.session_id().is_none());
        assert_eq!(shard.guild_count(), 0);
    }

    #[tokio::test]
    async fn test_ready_stores_session_and_caches_guilds() {
        let (shard, mut rx) = test_shard();
        shard.set_state(SessionState::Identifying);

        shard.handle_frame(READY).await.unwrap();

        assert_eq!(shard.state(), SessionState::Active);
        assert_eq!(shard.session_id().as_deref(), Some("abcdef"));
        assert_eq!(shard.sequence(), 1);
        assert_eq!(shard.guild_count(), 2);
        assert_eq!(shard.unavailable_guild_count(), 1);

        let event = rx.try_recv().unwrap();
        assert!(matches!(event, Event::Ready { shard_id: ShardId(0) }));
    }

    #[tokio::test]
    async fn test_guild_create_emits_only_on_first_sight() {
        let (shard, mut rx) = test_shard();
        shard.set_state(SessionState::Active);

        let guild_create =
            r#"{"op": 0, "t": "GUILD_CREATE", "s": 2, "d": {"id": "99", "name": "hideout"}}"#;

        shard.handle_frame(guild_create).await.unwrap();
        assert!(matches!(rx.try_recv().unwrap(), Event::GuildCreate { .. }));

        // a repeat sighting (lazy load) updates in place without re-emitting
        let updated =
            r#"{"op": 0, "t": "GUILD_CREATE", "s": 3, "d": {"id": "99", "name": "hideout", "member_count": 7}}"#;
        shard.handle_frame(updated).await.unwrap();
        assert!(rx.try_recv().is_err());

        assert_eq!(shard.guild_count(), 1);
        let cached = shard.guilds().get(&Snowflake::new(99)).unwrap();
        assert_eq!(cached.member_count, 7);
    }

    #[tokio::test]
    async fn test_message_create_emits() {
        let (shard, mut rx) = test_shard();
        shard.set_state(SessionState::Active);

        shard
            .handle_frame(
                r#"{"op": 0, "t": "MESSAGE_CREATE", "s": 4, "d": {"id": "5", "channel_id": "6", "content": "ping"}}"#,
            )
            .await
            .unwrap();

        match rx.try_recv().unwrap() {
            Event::MessageCreate { message, .. } => assert_eq!(message.content, "ping"),
            other => panic!("expected MessageCreate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_dispatch_is_ignored() {
        let (shard, mut rx) = test_shard();
        shard.set_state(SessionState::Active);

        shard
            .handle_frame(r#"{"op": 0, "t": "TYPING_START", "s": 5, "d": {}}"#)
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
        // the sequence still advances from the envelope
        assert_eq!(shard.sequence(), 5);
    }

    #[tokio::test]
    async fn test_sequence_never_decreases() {
        let (shard, _rx) = test_shard();
        shard.set_state(SessionState::Active);

        shard
            .handle_frame(r#"{"op": 0, "t": "TYPING_START", "s": 8, "d": {}}"#)
            .await
            .unwrap();
        shard
            .handle_frame(r#"{"op": 0, "t": "TYPING_START", "s": 3, "d": {}}"#)
            .await
            .unwrap();

        assert_eq!(shard.sequence(), 8);
    }

    #[tokio::test]
    async fn test_malformed_envelope_fatal_only_during_handshake() {
        let (shard, _rx) = test_shard();

        shard.set_state(SessionState::Identifying);
        assert!(matches!(
            shard.handle_frame("{not json").await,
            Err(GatewayError::Handshake(_))
        ));

        shard.set_state(SessionState::Active);
        assert_eq!(
            shard.handle_frame("{not json").await.unwrap(),
            FrameAction::Continue
        );
    }

    #[tokio::test]
    async fn test_heartbeat_ack_flips_flag_and_measures_latency() {
        let (shard, _rx) = test_shard();
        shard.set_state(SessionState::Active);
        shard.heartbeat_acked.store(false, Ordering::SeqCst);
        *shard.last_heartbeat_sent.lock() = Some(Instant::now());

        shard.handle_frame(r#"{"op": 11}"#).await.unwrap();

        assert!(shard.heartbeat_acked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_missed_ack_forces_reconnect_instead_of_second_beat() {
        let (shard, _rx) = test_shard();
        shard.set_state(SessionState::Active);
        shard.heartbeat_acked.store(false, Ordering::SeqCst);

        // tick fires while the previous beat is still unacknowledged
        assert!(!shard.heartbeat_tick().await);

        assert!(shard.reconnect_requested.load(Ordering::SeqCst));
        // no new heartbeat was sent
        assert!(shard.last_heartbeat_sent.lock().is_none());
    }

    #[tokio::test]
    async fn test_fresh_identify_resets_sequence_and_session() {
        let (shard, _rx) = test_shard();
        shard.set_state(SessionState::Active);
        shard
            .handle_frame(r#"{"op": 0, "t": "TYPING_START", "s": 42, "d": {}}"#)
            .await
            .unwrap();
        *shard.session_id.write() = Some("abcdef".to_string());

        // no socket, so the send itself fails, but identify has already
        // discarded the resumable state by then
        assert!(matches!(
            shard.send_identify().await,
            Err(GatewayError::Closed)
        ));
        assert_eq!(shard.sequence(), 0);
        assert!(shard.session_id().is_none());
    }

    #[tokio::test]
    async fn test_invalid_session_drops_token_unless_resumable() {
        let (shard, _rx) = test_shard();
        shard.set_state(SessionState::Active);
        *shard.session_id.write() = Some("abcdef".to_string());

        let action = shard.handle_frame(r#"{"op": 9, "d": true}"#).await.unwrap();
        assert_eq!(action, FrameAction::Reconnect);
        assert_eq!(shard.session_id().as_deref(), Some("abcdef"));

        let action = shard.handle_frame(r#"{"op": 9, "d": false}"#).await.unwrap();
        assert_eq!(action, FrameAction::Reconnect);
        assert!(shard.session_id().is_none());
    }

    #[tokio::test]
    async fn test_server_reconnect_resumes_with_preserved_sequence() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            // first session: handshake, a dispatch to advance the
            // sequence, then a reconnect request
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.send(hello(600_000)).await.unwrap();
            read_op(&mut ws, 2).await;
            ws.send(WsMessage::Text(READY.to_string())).await.unwrap();
            ws.send(WsMessage::Text(
                r#"{"op": 0, "t": "TYPING_START", "s": 7, "d": {}}"#.to_string(),
            ))
            .await
            .unwrap();
            ws.send(WsMessage::Text(r#"{"op": 7, "d": null}"#.to_string()))
                .await
                .unwrap();

            // the shard opens a fresh socket and resumes on it
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.send(hello(600_000)).await.unwrap();
            read_op(&mut ws, 6).await
        });

        let (shard, _rx) = shard_for(&format!("ws://{addr}"));
        let running = tokio::spawn(Arc::clone(&shard).run());

        let resume = server.await.unwrap();
        assert_eq!(resume["d"]["token"], "token");
        assert_eq!(resume["d"]["session_id"], "abcdef");
        // the dispatch seq from the first session, not a reset
        assert_eq!(resume["d"]["seq"], 7);

        shard.close().await;
        let _ = running.await;
    }

    #[tokio::test]
    async fn test_missed_ack_closes_and_resumes_once() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.send(hello(200)).await.unwrap();

            // acknowledge nothing and count beats until the shard
            // force-closes the socket
            let mut beats = 0;
            let mut identified = false;
            loop {
                match ws.next().await {
                    Some(Ok(WsMessage::Text(text))) => {
                        let frame: Value = serde_json::from_str(&text).unwrap();
                        if frame["op"] == 1 {
                            beats += 1;
                        } else if frame["op"] == 2 && !identified {
                            identified = true;
                            ws.send(WsMessage::Text(READY.to_string())).await.unwrap();
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }

            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.send(hello(600_000)).await.unwrap();
            let resume = read_op(&mut ws, 6).await;
            (beats, resume)
        });

        let (shard, _rx) = shard_for(&format!("ws://{addr}"));
        let running = tokio::spawn(Arc::clone(&shard).run());

        let (beats, resume) = server.await.unwrap();
        // never a second beat while the first is unacknowledged
        assert_eq!(beats, 1);
        assert_eq!(resume["d"]["session_id"], "abcdef");
        assert_eq!(resume["d"]["seq"], 1);

        shard.close().await;
        let _ = running.await;
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (shard, _rx) = test_shard();
        shard.close().await;
        shard.close().await;
        assert_eq!(shard.state(), SessionState::Disconnected);
    }
}
