use crate::component::ChatComponent;
use crate::events::Event;
use bytes::BytesMut;
use lodestone_protocol::{
    codec, offline_uuid, sign_chat, ClientSettings, ClientboundPacket, Connection, ProtocolError,
    ServerboundPacket, State, Version,
};
use rsa::RsaPrivateKey;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::net::{lookup_host, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_PORT: u16 = 25565;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client is not connected")]
    NotConnected,
    #[error("client is in state {found}, expected {expected}")]
    InvalidState { expected: State, found: State },
    #[error("invalid username")]
    InvalidUsername,
    #[error("invalid server address {0:?}")]
    InvalidAddress(String),
    #[error("disconnected by server: {0}")]
    Disconnected(String),
    #[error("expected {expected}, got {found}")]
    UnexpectedPacket {
        expected: &'static str,
        found: &'static str,
    },
    #[error("chat signing failed: {0}")]
    Signing(#[from] rsa::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// The position last pushed to the server, cached so partial updates keep
/// their unchanged axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub head_yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

/// Configures a [`Client`]. Obtained from [`Client::builder`].
pub struct ClientBuilder {
    address: String,
    server_hostname: Option<String>,
    version: Version,
    username: String,
    uuid: Uuid,
    brand: String,
    settings: ClientSettings,
    signing_key: Option<RsaPrivateKey>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            address: format!("127.0.0.1:{}", DEFAULT_PORT),
            server_hostname: None,
            version: Version::LATEST,
            username: "Lodestone".to_string(),
            uuid: Uuid::nil(),
            brand: "vanilla".to_string(),
            settings: ClientSettings::default(),
            signing_key: None,
        }
    }
}

impl ClientBuilder {
    /// Server address as `host` or `host:port`; the port defaults to 25565.
    /// Name resolution happens at [`Client::connect`], where failures are
    /// reported rather than swallowed.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Hostname to report in the Handshake, when it should differ from the
    /// dialed address (e.g. behind a proxy).
    pub fn server_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.server_hostname = Some(hostname.into());
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Identity UUID. When left nil it is derived with
    /// [`offline_uuid`] for versions that put the UUID on the wire.
    pub fn uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = uuid;
        self
    }

    /// Brand string reported on the `minecraft:brand` plugin channel.
    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    /// RSA key for chat signing. Without one, chat goes out unsigned and
    /// servers enforcing secure chat may reject it.
    pub fn signing_key(mut self, key: RsaPrivateKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    pub fn build(self) -> Client {
        Client {
            address: self.address,
            server_hostname: self.server_hostname,
            version: self.version,
            username: self.username,
            uuid: self.uuid,
            brand: self.brand,
            settings: self.settings,
            signing_key: self.signing_key,
            position: Mutex::new(PlayerPosition::default()),
            conn: Mutex::new(None),
            remote: Mutex::new(None),
            reader: Mutex::new(None),
        }
    }
}

struct ReaderHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// An offline-mode client for one server session.
///
/// Drives the handshake, login and configuration state machines, then
/// surfaces play-state packets as [`Event`]s. `chat` and `set_position` may
/// be called concurrently with the read loop.
pub struct Client {
    address: String,
    server_hostname: Option<String>,
    version: Version,
    username: String,
    uuid: Uuid,
    brand: String,
    settings: ClientSettings,
    signing_key: Option<RsaPrivateKey>,

    position: Mutex<PlayerPosition>,
    conn: Mutex<Option<Arc<Connection>>>,
    remote: Mutex<Option<(String, u16)>>,
    reader: Mutex<Option<ReaderHandle>>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The identity UUID the session uses: the configured one, or the
    /// offline-mode derivation for versions that send it on the wire.
    pub fn effective_uuid(&self) -> Uuid {
        if self.uuid.is_nil() && self.version >= Version::V1_19_2 {
            offline_uuid(&self.username)
        } else {
            self.uuid
        }
    }

    /// Dial the server, tearing down any previous session first.
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.close().await;

        let (host, port) = split_address(&self.address)
            .ok_or_else(|| ClientError::InvalidAddress(self.address.clone()))?;
        let addr = lookup_host((host.as_str(), port))
            .await?
            .next()
            .ok_or_else(|| ClientError::InvalidAddress(self.address.clone()))?;

        let stream = TcpStream::connect(addr).await?;
        debug!("connected to {} ({})", self.address, addr);

        *self.conn.lock().expect("conn lock") = Some(Arc::new(Connection::new(stream, self.version)));
        *self.remote.lock().expect("remote lock") = Some((host, port));
        Ok(())
    }

    /// Stop the read loop and release the transport. Idempotent. The event
    /// channel closes when the loop exits; it is never closed twice.
    pub async fn close(&self) {
        let handle = self.reader.lock().expect("reader lock").take();
        if let Some(handle) = handle {
            let _ = handle.shutdown.send(true);
            let _ = handle.task.await;
        }
        let conn = self.conn.lock().expect("conn lock").take();
        if let Some(conn) = conn {
            let _ = conn.close().await;
        }
    }

    /// Query the server list: returns the status JSON and the ping round
    /// trip.
    pub async fn status(&self) -> Result<(String, Duration), ClientError> {
        self.connect().await?;
        let conn = self.connection()?;

        self.send_handshake(&conn, State::Status).await?;
        conn.set_state(State::Status);

        conn.write_packet(&ServerboundPacket::StatusRequest).await?;
        let json = match conn.read_packet().await? {
            ClientboundPacket::StatusResponse { json } => json,
            other => {
                return Err(ClientError::UnexpectedPacket {
                    expected: "ClientboundStatusResponse",
                    found: other.kind().name(),
                })
            }
        };

        let latency = self.ping_roundtrip(&conn).await?;
        Ok((json, latency))
    }

    /// Measure one ping round trip on an established Status session.
    pub async fn ping(&self) -> Result<Duration, ClientError> {
        let conn = self.connection()?;
        self.ping_roundtrip(&conn).await
    }

    async fn ping_roundtrip(&self, conn: &Arc<Connection>) -> Result<Duration, ClientError> {
        let start = Instant::now();
        conn.write_packet(&ServerboundPacket::Ping {
            payload: unix_millis(),
        })
        .await?;
        match conn.read_packet().await? {
            ClientboundPacket::Pong { .. } => Ok(start.elapsed()),
            other => Err(ClientError::UnexpectedPacket {
                expected: "ClientboundPong",
                found: other.kind().name(),
            }),
        }
    }

    /// Log into the server and advance to Play, answering everything the
    /// login and configuration phases ask of us.
    pub async fn join(&self) -> Result<(), ClientError> {
        self.connect().await?;
        let conn = self.connection()?;

        self.send_handshake(&conn, State::Login).await?;
        conn.set_state(State::Login);
        self.send_login(&conn).await?;
        self.run_login(&conn).await
    }

    /// [`Client::join`], then spawn the read loop and return its event
    /// stream. The first event is always `Ready`.
    pub async fn join_and_listen(
        &self,
        capacity: usize,
    ) -> Result<mpsc::Receiver<Event>, ClientError> {
        self.join().await?;
        let conn = self.connection()?;

        let (tx, rx) = mpsc::channel(capacity.max(1));
        tx.send(Event::Ready {
            username: self.username.clone(),
        })
        .await
        .ok();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(read_loop(conn, tx, shutdown_rx));
        *self.reader.lock().expect("reader lock") = Some(ReaderHandle {
            shutdown: shutdown_tx,
            task,
        });

        Ok(rx)
    }

    /// Send a chat message. Play state only.
    pub async fn chat(&self, message: &str) -> Result<(), ClientError> {
        let conn = self.connection()?;
        ensure_play(&conn)?;

        let timestamp = unix_millis();
        let salt = rand::random::<i64>();
        let signature = match &self.signing_key {
            Some(key) if self.version >= Version::V1_19 => Some(sign_chat(
                key,
                self.version,
                &self.effective_uuid(),
                message,
                timestamp,
                salt,
            )?),
            _ => None,
        };

        conn.write_packet(&ServerboundPacket::ChatMessage {
            message: message.to_string(),
            timestamp,
            salt,
            signature,
        })
        .await?;
        Ok(())
    }

    /// Update the cached position and push it to the server. Play state
    /// only. Head yaw is cached but has no slot in this packet's wire form.
    #[allow(clippy::too_many_arguments)]
    pub async fn set_position(
        &self,
        x: f64,
        y: f64,
        z: f64,
        yaw: f32,
        head_yaw: f32,
        pitch: f32,
        on_ground: bool,
    ) -> Result<(), ClientError> {
        let conn = self.connection()?;
        ensure_play(&conn)?;

        let snapshot = {
            let mut position = self.position.lock().expect("position lock");
            *position = PlayerPosition {
                x,
                y,
                z,
                yaw,
                head_yaw,
                pitch,
                on_ground,
            };
            *position
        };

        conn.write_packet(&ServerboundPacket::PlayerPosition {
            x: snapshot.x,
            y: snapshot.y,
            z: snapshot.z,
            yaw: snapshot.yaw,
            pitch: snapshot.pitch,
            on_ground: snapshot.on_ground,
        })
        .await?;
        Ok(())
    }

    /// The last position handed to [`Client::set_position`].
    pub fn position(&self) -> PlayerPosition {
        *self.position.lock().expect("position lock")
    }

    fn connection(&self) -> Result<Arc<Connection>, ClientError> {
        self.conn
            .lock()
            .expect("conn lock")
            .as_ref()
            .cloned()
            .ok_or(ClientError::NotConnected)
    }

    async fn send_handshake(
        &self,
        conn: &Arc<Connection>,
        next: State,
    ) -> Result<(), ClientError> {
        let (host, port) = self
            .remote
            .lock()
            .expect("remote lock")
            .clone()
            .ok_or(ClientError::NotConnected)?;
        let hostname = self.server_hostname.clone().unwrap_or(host);
        let next_state = next
            .handshake_next()
            .ok_or(ClientError::InvalidState {
                expected: State::Status,
                found: next,
            })?;

        conn.write_packet(&ServerboundPacket::Handshake {
            protocol_version: self.version.protocol(),
            server_address: hostname,
            server_port: port,
            next_state,
        })
        .await?;
        Ok(())
    }

    async fn send_login(&self, conn: &Arc<Connection>) -> Result<(), ClientError> {
        if self.username.is_empty() {
            return Err(ClientError::InvalidUsername);
        }
        conn.write_packet(&ServerboundPacket::LoginStart {
            username: self.username.clone(),
            uuid: self.effective_uuid(),
        })
        .await?;
        Ok(())
    }

    async fn run_login(&self, conn: &Arc<Connection>) -> Result<(), ClientError> {
        loop {
            let packet = match conn.read_packet().await {
                Ok(packet) => packet,
                Err(e) if e.is_unknown_packet() => continue,
                Err(e) => return Err(e.into()),
            };

            match packet {
                ClientboundPacket::SetCompression { threshold } => {
                    debug!("compression enabled, threshold {}", threshold);
                    conn.set_compression(threshold);
                }

                ClientboundPacket::Disconnect { reason } => {
                    return Err(ClientError::Disconnected(reason));
                }

                ClientboundPacket::LoginSuccess { username, uuid } => {
                    info!("logged in as {} ({})", username, uuid);
                    if self.version >= Version::V1_20_2 {
                        conn.write_packet(&ServerboundPacket::LoginAcknowledged)
                            .await?;
                        conn.set_state(State::Configuration);
                        return self.run_configuration(conn).await;
                    }

                    conn.set_state(State::Play);
                    conn.write_packet(&ServerboundPacket::ClientSettings(self.settings.clone()))
                        .await?;
                    return Ok(());
                }

                // Legacy servers may jump straight to Play.
                ClientboundPacket::JoinGame => {
                    conn.set_state(State::Play);
                    return Ok(());
                }

                ClientboundPacket::KeepAlive { id } => {
                    conn.write_packet(&ServerboundPacket::KeepAlive { id })
                        .await?;
                }

                other => {
                    debug!("ignoring {} during login", other.kind());
                }
            }
        }
    }

    async fn run_configuration(&self, conn: &Arc<Connection>) -> Result<(), ClientError> {
        conn.write_packet(&ServerboundPacket::ClientSettings(self.settings.clone()))
            .await?;

        loop {
            let packet = match conn.read_packet().await {
                Ok(packet) => packet,
                Err(e) if e.is_unknown_packet() => continue,
                Err(e) => return Err(e.into()),
            };

            match packet {
                ClientboundPacket::ConfigKeepAlive { id } => {
                    conn.write_packet(&ServerboundPacket::ConfigKeepAlive { id })
                        .await?;
                }

                ClientboundPacket::CustomPayload { channel, .. } => {
                    if channel == "minecraft:brand" {
                        let mut data = BytesMut::new();
                        codec::write_string(&mut data, &self.brand);
                        conn.write_packet(&ServerboundPacket::CustomPayload {
                            channel,
                            data: data.to_vec(),
                        })
                        .await?;
                    } else {
                        debug!("ignoring plugin message on {}", channel);
                    }
                }

                ClientboundPacket::SelectKnownPacks { .. } => {
                    // An empty list is always acceptable; the server then
                    // sends its registries in full.
                    conn.write_packet(&ServerboundPacket::SelectKnownPacks { packs: Vec::new() })
                        .await?;
                    if self.version >= Version::V1_21_3 {
                        conn.write_packet(&ServerboundPacket::FinishConfiguration)
                            .await?;
                    }
                }

                ClientboundPacket::FinishConfiguration => {
                    if self.version < Version::V1_21_3 {
                        conn.write_packet(&ServerboundPacket::FinishConfiguration)
                            .await?;
                    }
                    conn.set_state(State::Play);
                    return Ok(());
                }

                ClientboundPacket::CookieRequest { key } => {
                    conn.write_packet(&ServerboundPacket::CookieResponse { key, data: None })
                        .await?;
                }

                ClientboundPacket::Disconnect { reason } => {
                    return Err(ClientError::Disconnected(reason));
                }

                ClientboundPacket::ConfigPing { .. }
                | ClientboundPacket::RegistryData { .. }
                | ClientboundPacket::FeatureFlags { .. }
                | ClientboundPacket::UpdateTags { .. } => {}

                other => {
                    debug!("ignoring {} during configuration", other.kind());
                }
            }
        }
    }
}

fn ensure_play(conn: &Connection) -> Result<(), ClientError> {
    let state = conn.state();
    if state != State::Play {
        return Err(ClientError::InvalidState {
            expected: State::Play,
            found: state,
        });
    }
    Ok(())
}

fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn split_address(address: &str) -> Option<(String, u16)> {
    match address.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => {
            Some((host.to_string(), port.parse().ok()?))
        }
        Some(_) => None,
        None => Some((address.to_string(), DEFAULT_PORT)),
    }
}

/// Dispatch play-state packets until the server disconnects, the transport
/// fails, or shutdown is signalled. Sole producer of the event channel;
/// the channel closes when this task drops its sender.
async fn read_loop(
    conn: Arc<Connection>,
    events: mpsc::Sender<Event>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return;
                }
            }
            result = conn.read_packet() => match result {
                Ok(ClientboundPacket::KeepAlive { id }) => {
                    if let Err(e) = conn
                        .write_packet(&ServerboundPacket::KeepAlive { id })
                        .await
                    {
                        warn!("failed to echo keep-alive: {}", e);
                    }
                    let _ = events.send(Event::KeepAlive { id }).await;
                }

                Ok(ClientboundPacket::ChatMessage { content, sender }) => {
                    let component = ChatComponent::from_json(&content).unwrap_or_default();
                    let message = component.plain_text();
                    let _ = events
                        .send(Event::ChatMessage {
                            component,
                            message,
                            sender,
                            time: SystemTime::now(),
                        })
                        .await;
                }

                Ok(ClientboundPacket::Disconnect { reason }) => {
                    let _ = events.send(Event::Disconnect { reason }).await;
                    return;
                }

                Ok(_) => {}

                Err(e) if e.is_unknown_packet() => {}

                Err(e) => {
                    if !is_eof(&e) {
                        warn!("read loop error: {}", e);
                    }
                    let _ = events
                        .send(Event::Disconnect {
                            reason: e.to_string(),
                        })
                        .await;
                    return;
                }
            }
        }
    }
}

fn is_eof(error: &ProtocolError) -> bool {
    matches!(error, ProtocolError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
}
