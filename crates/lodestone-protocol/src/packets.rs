use crate::codec::*;
use crate::version::Version;
use bytes::{BufMut, BytesMut};
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Client preferences sent in the ClientSettings packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub locale: String,
    pub view_distance: u8,
    pub chat_mode: i32,
    pub chat_colors: bool,
    pub skin_parts: u8,
    pub main_hand: i32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            locale: "en_US".to_string(),
            view_distance: 10,
            chat_mode: 0,
            chat_colors: true,
            skin_parts: 0x7F,
            main_hand: 1,
        }
    }
}

/// A resource pack known to both sides of a Configuration exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownPack {
    pub namespace: String,
    pub id: String,
    pub version: String,
}

/// One registry's worth of tag data in an UpdateTags packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryTag {
    pub registry: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub entries: Vec<i32>,
}

/// Every packet the client sends. Encode-only; the registry maps each kind
/// to its numeric id for the active (version, state).
#[derive(Debug, Clone, PartialEq)]
pub enum ServerboundPacket {
    Handshake {
        protocol_version: i32,
        server_address: String,
        server_port: u16,
        next_state: i32,
    },
    StatusRequest,
    Ping {
        payload: i64,
    },
    LoginStart {
        username: String,
        uuid: Uuid,
    },
    LoginAcknowledged,
    ClientSettings(ClientSettings),
    /// Signature, when present, is produced by [`sign_chat`] for the same
    /// (version, timestamp, salt) and is already padded for >= 1.19.3.
    ChatMessage {
        message: String,
        timestamp: i64,
        salt: i64,
        signature: Option<Vec<u8>>,
    },
    KeepAlive {
        id: i64,
    },
    ConfigKeepAlive {
        id: i64,
    },
    FinishConfiguration,
    SelectKnownPacks {
        packs: Vec<KnownPack>,
    },
    CookieResponse {
        key: String,
        data: Option<Vec<u8>>,
    },
    CustomPayload {
        channel: String,
        data: Vec<u8>,
    },
    ConfigPong {
        id: i32,
    },
    PlayerPosition {
        x: f64,
        y: f64,
        z: f64,
        yaw: f32,
        pitch: f32,
        on_ground: bool,
    },
}

/// Every packet the client understands. Decode-only.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientboundPacket {
    StatusResponse {
        json: String,
    },
    Pong {
        payload: i64,
    },
    LoginSuccess {
        username: String,
        uuid: Uuid,
    },
    SetCompression {
        threshold: i32,
    },
    Disconnect {
        reason: String,
    },
    KeepAlive {
        id: i64,
    },
    ConfigKeepAlive {
        id: i64,
    },
    FinishConfiguration,
    SelectKnownPacks {
        packs: Vec<KnownPack>,
    },
    CookieRequest {
        key: String,
    },
    CustomPayload {
        channel: String,
        data: Vec<u8>,
    },
    ConfigPing {
        id: i32,
    },
    RegistryData {
        registry: String,
        data: Vec<u8>,
    },
    FeatureFlags {
        features: Vec<String>,
    },
    UpdateTags {
        tags: Vec<RegistryTag>,
    },
    JoinGame,
    /// Decoding of the structured chat payload is deliberately left out;
    /// the envelope is drained and the fields stay empty.
    ChatMessage {
        content: String,
        sender: String,
    },
}

/// Shape names for serverbound packets, used as registry keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerboundKind {
    Handshake,
    StatusRequest,
    Ping,
    LoginStart,
    LoginAcknowledged,
    ClientSettings,
    ChatMessage,
    KeepAlive,
    ConfigKeepAlive,
    FinishConfiguration,
    SelectKnownPacks,
    CookieResponse,
    CustomPayload,
    ConfigPong,
    PlayerPosition,
}

/// Shape names for clientbound packets, used as registry keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientboundKind {
    StatusResponse,
    Pong,
    LoginSuccess,
    SetCompression,
    Disconnect,
    KeepAlive,
    ConfigKeepAlive,
    FinishConfiguration,
    SelectKnownPacks,
    CookieRequest,
    CustomPayload,
    ConfigPing,
    RegistryData,
    FeatureFlags,
    UpdateTags,
    JoinGame,
    ChatMessage,
}

impl ServerboundKind {
    pub fn name(self) -> &'static str {
        match self {
            ServerboundKind::Handshake => "ServerboundHandshake",
            ServerboundKind::StatusRequest => "ServerboundStatusRequest",
            ServerboundKind::Ping => "ServerboundPing",
            ServerboundKind::LoginStart => "ServerboundLoginStart",
            ServerboundKind::LoginAcknowledged => "ServerboundLoginAcknowledged",
            ServerboundKind::ClientSettings => "ServerboundClientSettings",
            ServerboundKind::ChatMessage => "ServerboundChatMessage",
            ServerboundKind::KeepAlive => "ServerboundKeepAlive",
            ServerboundKind::ConfigKeepAlive => "ServerboundConfigKeepAlive",
            ServerboundKind::FinishConfiguration => "ServerboundFinishConfiguration",
            ServerboundKind::SelectKnownPacks => "ServerboundSelectKnownPacks",
            ServerboundKind::CookieResponse => "ServerboundCookieResponse",
            ServerboundKind::CustomPayload => "ServerboundCustomPayload",
            ServerboundKind::ConfigPong => "ServerboundConfigPong",
            ServerboundKind::PlayerPosition => "ServerboundPlayerPosition",
        }
    }
}

impl ClientboundKind {
    pub fn name(self) -> &'static str {
        match self {
            ClientboundKind::StatusResponse => "ClientboundStatusResponse",
            ClientboundKind::Pong => "ClientboundPong",
            ClientboundKind::LoginSuccess => "ClientboundLoginSuccess",
            ClientboundKind::SetCompression => "ClientboundSetCompression",
            ClientboundKind::Disconnect => "ClientboundDisconnect",
            ClientboundKind::KeepAlive => "ClientboundKeepAlive",
            ClientboundKind::ConfigKeepAlive => "ClientboundConfigKeepAlive",
            ClientboundKind::FinishConfiguration => "ClientboundFinishConfiguration",
            ClientboundKind::SelectKnownPacks => "ClientboundSelectKnownPacks",
            ClientboundKind::CookieRequest => "ClientboundCookieRequest",
            ClientboundKind::CustomPayload => "ClientboundCustomPayload",
            ClientboundKind::ConfigPing => "ClientboundConfigPing",
            ClientboundKind::RegistryData => "ClientboundRegistryData",
            ClientboundKind::FeatureFlags => "ClientboundFeatureFlags",
            ClientboundKind::UpdateTags => "ClientboundUpdateTags",
            ClientboundKind::JoinGame => "ClientboundJoinGame",
            ClientboundKind::ChatMessage => "ClientboundChatMessage",
        }
    }
}

impl std::fmt::Display for ServerboundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for ClientboundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl ServerboundPacket {
    pub fn kind(&self) -> ServerboundKind {
        match self {
            ServerboundPacket::Handshake { .. } => ServerboundKind::Handshake,
            ServerboundPacket::StatusRequest => ServerboundKind::StatusRequest,
            ServerboundPacket::Ping { .. } => ServerboundKind::Ping,
            ServerboundPacket::LoginStart { .. } => ServerboundKind::LoginStart,
            ServerboundPacket::LoginAcknowledged => ServerboundKind::LoginAcknowledged,
            ServerboundPacket::ClientSettings(_) => ServerboundKind::ClientSettings,
            ServerboundPacket::ChatMessage { .. } => ServerboundKind::ChatMessage,
            ServerboundPacket::KeepAlive { .. } => ServerboundKind::KeepAlive,
            ServerboundPacket::ConfigKeepAlive { .. } => ServerboundKind::ConfigKeepAlive,
            ServerboundPacket::FinishConfiguration => ServerboundKind::FinishConfiguration,
            ServerboundPacket::SelectKnownPacks { .. } => ServerboundKind::SelectKnownPacks,
            ServerboundPacket::CookieResponse { .. } => ServerboundKind::CookieResponse,
            ServerboundPacket::CustomPayload { .. } => ServerboundKind::CustomPayload,
            ServerboundPacket::ConfigPong { .. } => ServerboundKind::ConfigPong,
            ServerboundPacket::PlayerPosition { .. } => ServerboundKind::PlayerPosition,
        }
    }

    /// Serialize the packet body (no id, no frame) for `version`.
    pub fn encode(&self, buf: &mut BytesMut, version: Version) -> CodecResult<()> {
        match self {
            ServerboundPacket::Handshake {
                protocol_version,
                server_address,
                server_port,
                next_state,
            } => {
                write_varint(buf, *protocol_version);
                write_string(buf, server_address);
                write_u16(buf, *server_port);
                write_varint(buf, *next_state);
            }

            ServerboundPacket::StatusRequest
            | ServerboundPacket::LoginAcknowledged
            | ServerboundPacket::FinishConfiguration => {}

            ServerboundPacket::Ping { payload } => write_i64(buf, *payload),

            ServerboundPacket::LoginStart { username, uuid } => {
                write_string(buf, username);

                // 1.19 through 1.19.2 carry an optional signature block the
                // offline client always declines.
                if version >= Version::V1_19 && version <= Version::V1_19_2 {
                    write_bool(buf, false);
                }

                if version >= Version::V1_20_2 {
                    write_uuid(buf, uuid);
                } else if version >= Version::V1_19_2 && !uuid.is_nil() {
                    write_bool(buf, true);
                    write_uuid(buf, uuid);
                }
            }

            ServerboundPacket::ClientSettings(settings) => {
                write_string(buf, &settings.locale);
                write_u8(buf, settings.view_distance);

                if version < Version::V1_8 {
                    write_u8(buf, 0x1);
                } else {
                    write_varint(buf, settings.chat_mode);
                }

                write_bool(buf, settings.chat_colors);

                if version < Version::V1_8 {
                    write_u8(buf, settings.skin_parts & 0x01);
                    write_bool(buf, true);
                } else {
                    write_u8(buf, settings.skin_parts);
                }

                if version >= Version::V1_9 {
                    write_varint(buf, settings.main_hand);
                }
                if version >= Version::V1_17_1 {
                    write_bool(buf, false);
                }
                if version >= Version::V1_18 {
                    write_bool(buf, true);
                }
                if version >= Version::V1_21_3 {
                    write_varint(buf, 0);
                }
            }

            ServerboundPacket::ChatMessage {
                message,
                timestamp,
                salt,
                signature,
            } => {
                if version < Version::V1_19 {
                    write_string(buf, message);
                    return Ok(());
                }

                write_string(buf, message);
                write_i64(buf, *timestamp);
                write_i64(buf, *salt);

                if version >= Version::V1_19_3 {
                    match signature {
                        Some(sig) => {
                            write_bool(buf, true);
                            buf.put_slice(sig);
                        }
                        None => write_bool(buf, false),
                    }
                    // Message count, then the acknowledged-messages bitset.
                    write_varint(buf, 0);
                    buf.put_slice(&[0u8; 3]);
                    if version >= Version::V1_21_5 {
                        write_u8(buf, 0);
                    }
                } else if version >= Version::V1_19_2 {
                    write_byte_array(buf, signature.as_deref().unwrap_or(&[]));
                    write_bool(buf, false);
                    write_varint(buf, 0);
                    write_bool(buf, false);
                } else {
                    write_byte_array(buf, signature.as_deref().unwrap_or(&[]));
                    write_bool(buf, false);
                }
            }

            ServerboundPacket::KeepAlive { id } => {
                if version >= Version::V1_12_2 {
                    write_i64(buf, *id);
                } else {
                    write_varint(buf, *id as i32);
                }
            }

            ServerboundPacket::ConfigKeepAlive { id } => write_i64(buf, *id),

            ServerboundPacket::SelectKnownPacks { packs } => {
                write_varint(buf, packs.len() as i32);
                for pack in packs {
                    write_string(buf, &pack.namespace);
                    write_string(buf, &pack.id);
                    write_string(buf, &pack.version);
                }
            }

            ServerboundPacket::CookieResponse { key, data } => {
                write_string(buf, key);
                match data {
                    Some(data) => {
                        write_bool(buf, true);
                        write_byte_array(buf, data);
                    }
                    None => write_bool(buf, false),
                }
            }

            ServerboundPacket::CustomPayload { channel, data } => {
                write_string(buf, channel);
                buf.put_slice(data);
            }

            ServerboundPacket::ConfigPong { id } => write_i32(buf, *id),

            ServerboundPacket::PlayerPosition {
                x,
                y,
                z,
                yaw,
                pitch,
                on_ground,
            } => {
                write_f64(buf, *x);
                write_f64(buf, *y);
                write_f64(buf, *z);
                write_f32(buf, *yaw);
                write_f32(buf, *pitch);
                write_bool(buf, *on_ground);
            }
        }
        Ok(())
    }
}

impl ClientboundPacket {
    pub fn kind(&self) -> ClientboundKind {
        match self {
            ClientboundPacket::StatusResponse { .. } => ClientboundKind::StatusResponse,
            ClientboundPacket::Pong { .. } => ClientboundKind::Pong,
            ClientboundPacket::LoginSuccess { .. } => ClientboundKind::LoginSuccess,
            ClientboundPacket::SetCompression { .. } => ClientboundKind::SetCompression,
            ClientboundPacket::Disconnect { .. } => ClientboundKind::Disconnect,
            ClientboundPacket::KeepAlive { .. } => ClientboundKind::KeepAlive,
            ClientboundPacket::ConfigKeepAlive { .. } => ClientboundKind::ConfigKeepAlive,
            ClientboundPacket::FinishConfiguration => ClientboundKind::FinishConfiguration,
            ClientboundPacket::SelectKnownPacks { .. } => ClientboundKind::SelectKnownPacks,
            ClientboundPacket::CookieRequest { .. } => ClientboundKind::CookieRequest,
            ClientboundPacket::CustomPayload { .. } => ClientboundKind::CustomPayload,
            ClientboundPacket::ConfigPing { .. } => ClientboundKind::ConfigPing,
            ClientboundPacket::RegistryData { .. } => ClientboundKind::RegistryData,
            ClientboundPacket::FeatureFlags { .. } => ClientboundKind::FeatureFlags,
            ClientboundPacket::UpdateTags { .. } => ClientboundKind::UpdateTags,
            ClientboundPacket::JoinGame => ClientboundKind::JoinGame,
            ClientboundPacket::ChatMessage { .. } => ClientboundKind::ChatMessage,
        }
    }

    /// Deserialize a packet body of the given shape for `version`.
    ///
    /// Bytes left in `buf` after a successful decode belong to fields this
    /// client does not model; the caller discards them.
    pub fn decode(
        kind: ClientboundKind,
        buf: &mut BytesMut,
        version: Version,
    ) -> CodecResult<ClientboundPacket> {
        let packet = match kind {
            ClientboundKind::StatusResponse => ClientboundPacket::StatusResponse {
                json: read_string(buf)?,
            },

            ClientboundKind::Pong => ClientboundPacket::Pong {
                payload: read_i64(buf)?,
            },

            ClientboundKind::LoginSuccess => {
                let uuid = if version >= Version::V1_16 {
                    read_uuid(buf)?
                } else {
                    read_string_uuid(buf)?
                };
                let username = read_string(buf)?;

                if version >= Version::V1_19 {
                    let prop_count = read_varint(buf)?;
                    for _ in 0..prop_count {
                        let _name = read_string(buf)?;
                        let _value = read_string(buf)?;
                        if read_bool(buf)? {
                            let _signature = read_string(buf)?;
                        }
                    }
                }

                if version >= Version::V1_20_5 && version <= Version::V1_21_1 {
                    let _strict_error_handling = read_bool(buf)?;
                }

                ClientboundPacket::LoginSuccess { username, uuid }
            }

            ClientboundKind::SetCompression => ClientboundPacket::SetCompression {
                threshold: read_varint(buf)?,
            },

            ClientboundKind::Disconnect => ClientboundPacket::Disconnect {
                reason: read_string(buf)?,
            },

            ClientboundKind::KeepAlive => {
                let id = if version >= Version::V1_12_2 {
                    read_i64(buf)?
                } else {
                    read_varint(buf)? as i64
                };
                ClientboundPacket::KeepAlive { id }
            }

            ClientboundKind::ConfigKeepAlive => ClientboundPacket::ConfigKeepAlive {
                id: read_i64(buf)?,
            },

            ClientboundKind::FinishConfiguration => ClientboundPacket::FinishConfiguration,

            ClientboundKind::SelectKnownPacks => {
                let count = read_varint(buf)?;
                let mut packs = Vec::with_capacity(count.max(0) as usize);
                for _ in 0..count {
                    packs.push(KnownPack {
                        namespace: read_string(buf)?,
                        id: read_string(buf)?,
                        version: read_string(buf)?,
                    });
                }
                ClientboundPacket::SelectKnownPacks { packs }
            }

            ClientboundKind::CookieRequest => ClientboundPacket::CookieRequest {
                key: read_string(buf)?,
            },

            ClientboundKind::CustomPayload => {
                let channel = read_string(buf)?;
                let data = buf.split_to(buf.len()).to_vec();
                ClientboundPacket::CustomPayload { channel, data }
            }

            ClientboundKind::ConfigPing => ClientboundPacket::ConfigPing {
                id: read_i32(buf)?,
            },

            ClientboundKind::RegistryData => {
                let registry = read_string(buf)?;
                let data = read_byte_array(buf)?;
                ClientboundPacket::RegistryData { registry, data }
            }

            ClientboundKind::FeatureFlags => {
                let count = read_varint(buf)?;
                let mut features = Vec::with_capacity(count.max(0) as usize);
                for _ in 0..count {
                    features.push(read_string(buf)?);
                }
                ClientboundPacket::FeatureFlags { features }
            }

            ClientboundKind::UpdateTags => {
                let registry_count = read_varint(buf)?;
                let mut tags = Vec::with_capacity(registry_count.max(0) as usize);
                for _ in 0..registry_count {
                    let registry = read_string(buf)?;
                    let tag_count = read_varint(buf)?;
                    let mut registry_tags = Vec::with_capacity(tag_count.max(0) as usize);
                    for _ in 0..tag_count {
                        let name = read_string(buf)?;
                        let entry_count = read_varint(buf)?;
                        let mut entries = Vec::with_capacity(entry_count.max(0) as usize);
                        for _ in 0..entry_count {
                            entries.push(read_varint(buf)?);
                        }
                        registry_tags.push(Tag { name, entries });
                    }
                    tags.push(RegistryTag {
                        registry,
                        tags: registry_tags,
                    });
                }
                ClientboundPacket::UpdateTags { tags }
            }

            ClientboundKind::JoinGame => {
                buf.clear();
                ClientboundPacket::JoinGame
            }

            ClientboundKind::ChatMessage => {
                buf.clear();
                ClientboundPacket::ChatMessage {
                    content: String::new(),
                    sender: String::new(),
                }
            }
        };
        Ok(packet)
    }
}

/// Build the chat signature for `message` under the version's sign-input
/// layout: `be64(timestamp) || be64(salt) || message` before 1.19.2,
/// `be64(salt) || be64(timestamp) || uuid || message` from 1.19.2 on.
/// SHA-256 digest, RSASSA-PKCS1-v1_5. From 1.19.3 the wire field is a
/// fixed 256 bytes, so the result is padded or truncated to fit.
pub fn sign_chat(
    key: &RsaPrivateKey,
    version: Version,
    uuid: &Uuid,
    message: &str,
    timestamp: i64,
    salt: i64,
) -> Result<Vec<u8>, rsa::Error> {
    let mut input = Vec::with_capacity(32 + message.len());
    if version >= Version::V1_19_2 {
        input.extend_from_slice(&salt.to_be_bytes());
        input.extend_from_slice(&timestamp.to_be_bytes());
        input.extend_from_slice(uuid.as_bytes());
    } else {
        input.extend_from_slice(&timestamp.to_be_bytes());
        input.extend_from_slice(&salt.to_be_bytes());
    }
    input.extend_from_slice(message.as_bytes());

    let digest = Sha256::digest(&input);
    let mut signature = key.sign(Pkcs1v15Sign::new::<Sha256>(), &digest)?;

    if version >= Version::V1_19_3 {
        signature.resize(256, 0);
    }
    Ok(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{read_string, read_varint};

    fn encoded(packet: &ServerboundPacket, version: Version) -> BytesMut {
        let mut buf = BytesMut::new();
        packet.encode(&mut buf, version).unwrap();
        buf
    }

    #[test]
    fn test_handshake_layout() {
        let packet = ServerboundPacket::Handshake {
            protocol_version: 767,
            server_address: "localhost".to_string(),
            server_port: 25565,
            next_state: 2,
        };
        let mut buf = encoded(&packet, Version::V1_21_1);
        assert_eq!(read_varint(&mut buf).unwrap(), 767);
        assert_eq!(read_string(&mut buf).unwrap(), "localhost");
        assert_eq!(crate::codec::read_u16(&mut buf).unwrap(), 25565);
        assert_eq!(read_varint(&mut buf).unwrap(), 2);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_login_start_pre_1_19_is_username_only() {
        let packet = ServerboundPacket::LoginStart {
            username: "Tester".to_string(),
            uuid: offline_uuid("Tester"),
        };
        let mut expected = BytesMut::new();
        write_string(&mut expected, "Tester");
        assert_eq!(encoded(&packet, Version::V1_18_2), expected);
    }

    #[test]
    fn test_login_start_1_19_adds_signature_refusal() {
        let packet = ServerboundPacket::LoginStart {
            username: "Tester".to_string(),
            uuid: Uuid::nil(),
        };
        let mut expected = BytesMut::new();
        write_string(&mut expected, "Tester");
        write_bool(&mut expected, false);
        assert_eq!(encoded(&packet, Version::V1_19), expected);
    }

    #[test]
    fn test_login_start_1_19_2_carries_optional_uuid() {
        let uuid = offline_uuid("Tester");
        let packet = ServerboundPacket::LoginStart {
            username: "Tester".to_string(),
            uuid,
        };
        // 1.19.2 sits in both windows: signature refusal, then the uuid.
        let mut expected = BytesMut::new();
        write_string(&mut expected, "Tester");
        write_bool(&mut expected, false);
        write_bool(&mut expected, true);
        write_uuid(&mut expected, &uuid);
        assert_eq!(encoded(&packet, Version::V1_19_2), expected);

        // 1.19.3 drops the refusal bool.
        let mut expected = BytesMut::new();
        write_string(&mut expected, "Tester");
        write_bool(&mut expected, true);
        write_uuid(&mut expected, &uuid);
        assert_eq!(encoded(&packet, Version::V1_19_3), expected);
    }

    #[test]
    fn test_login_start_1_20_2_uuid_is_unconditional() {
        let uuid = offline_uuid("Tester");
        let packet = ServerboundPacket::LoginStart {
            username: "Tester".to_string(),
            uuid,
        };
        let mut expected = BytesMut::new();
        write_string(&mut expected, "Tester");
        write_uuid(&mut expected, &uuid);
        assert_eq!(encoded(&packet, Version::V1_20_2), expected);
        assert_eq!(encoded(&packet, Version::V1_21_8), expected);
    }

    #[test]
    fn test_login_success_decode_string_uuid_pre_1_16() {
        let uuid = offline_uuid("Tester");
        let mut buf = BytesMut::new();
        write_string(&mut buf, &uuid.to_string());
        write_string(&mut buf, "Tester");
        let packet =
            ClientboundPacket::decode(ClientboundKind::LoginSuccess, &mut buf, Version::V1_15_2)
                .unwrap();
        assert_eq!(
            packet,
            ClientboundPacket::LoginSuccess {
                username: "Tester".to_string(),
                uuid,
            }
        );
    }

    #[test]
    fn test_login_success_decode_with_properties_and_tail() {
        let uuid = offline_uuid("Tester");
        for version in [Version::V1_20_5, Version::V1_21_1] {
            let mut buf = BytesMut::new();
            write_uuid(&mut buf, &uuid);
            write_string(&mut buf, "Tester");
            write_varint(&mut buf, 2);
            write_string(&mut buf, "textures");
            write_string(&mut buf, "payload");
            write_bool(&mut buf, true);
            write_string(&mut buf, "sig");
            write_string(&mut buf, "cape");
            write_string(&mut buf, "payload2");
            write_bool(&mut buf, false);
            write_bool(&mut buf, true); // strict error handling tail

            let packet =
                ClientboundPacket::decode(ClientboundKind::LoginSuccess, &mut buf, version)
                    .unwrap();
            assert!(buf.is_empty(), "tail must be consumed for {}", version);
            assert_eq!(
                packet,
                ClientboundPacket::LoginSuccess {
                    username: "Tester".to_string(),
                    uuid,
                }
            );
        }
    }

    #[test]
    fn test_login_success_no_tail_from_1_21_3() {
        let uuid = offline_uuid("Tester");
        let mut buf = BytesMut::new();
        write_uuid(&mut buf, &uuid);
        write_string(&mut buf, "Tester");
        write_varint(&mut buf, 0);
        ClientboundPacket::decode(ClientboundKind::LoginSuccess, &mut buf, Version::V1_21_3)
            .unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_client_settings_layout_per_version() {
        let settings = ClientSettings::default();
        let packet = ServerboundPacket::ClientSettings(settings.clone());

        // <= 1.7: locale, view, hardcoded chat byte, colors, one skin bit, cape.
        let mut expected = BytesMut::new();
        write_string(&mut expected, "en_US");
        write_u8(&mut expected, 10);
        write_u8(&mut expected, 0x1);
        write_bool(&mut expected, true);
        write_u8(&mut expected, 0x01);
        write_bool(&mut expected, true);
        assert_eq!(encoded(&packet, Version::V1_7_2), expected);

        // 1.8: full skin byte, varint chat mode, no main hand yet.
        let mut expected = BytesMut::new();
        write_string(&mut expected, "en_US");
        write_u8(&mut expected, 10);
        write_varint(&mut expected, 0);
        write_bool(&mut expected, true);
        write_u8(&mut expected, 0x7F);
        assert_eq!(encoded(&packet, Version::V1_8), expected);

        // 1.9 adds main hand.
        let mut expected_1_9 = expected.clone();
        write_varint(&mut expected_1_9, 1);
        assert_eq!(encoded(&packet, Version::V1_9), expected_1_9);

        // 1.17.1 adds text filtering, 1.18 adds server listing.
        let mut expected_1_17_1 = expected_1_9.clone();
        write_bool(&mut expected_1_17_1, false);
        assert_eq!(encoded(&packet, Version::V1_17_1), expected_1_17_1);

        let mut expected_1_18 = expected_1_17_1.clone();
        write_bool(&mut expected_1_18, true);
        assert_eq!(encoded(&packet, Version::V1_18), expected_1_18);

        // 1.21.3 adds the trailing particle-status varint.
        let mut expected_1_21_3 = expected_1_18.clone();
        write_varint(&mut expected_1_21_3, 0);
        assert_eq!(encoded(&packet, Version::V1_21_3), expected_1_21_3);
    }

    #[test]
    fn test_keep_alive_payload_switches_at_1_12_2() {
        let packet = ServerboundPacket::KeepAlive { id: 0x0123456789ABCDEF };

        let buf = encoded(&packet, Version::V1_12_2);
        assert_eq!(buf.len(), 8);

        let packet_small = ServerboundPacket::KeepAlive { id: 25565 };
        let mut buf = encoded(&packet_small, Version::V1_12_1);
        assert_eq!(read_varint(&mut buf).unwrap(), 25565);
        assert!(buf.is_empty());

        let mut cb = BytesMut::new();
        write_i64(&mut cb, 77);
        assert_eq!(
            ClientboundPacket::decode(ClientboundKind::KeepAlive, &mut cb, Version::V1_12_2)
                .unwrap(),
            ClientboundPacket::KeepAlive { id: 77 }
        );

        let mut cb = BytesMut::new();
        write_varint(&mut cb, 77);
        assert_eq!(
            ClientboundPacket::decode(ClientboundKind::KeepAlive, &mut cb, Version::V1_8)
                .unwrap(),
            ClientboundPacket::KeepAlive { id: 77 }
        );
    }

    #[test]
    fn test_chat_message_pre_1_19_is_plain_string() {
        let packet = ServerboundPacket::ChatMessage {
            message: "hello".to_string(),
            timestamp: 123,
            salt: 456,
            signature: None,
        };
        let mut expected = BytesMut::new();
        write_string(&mut expected, "hello");
        assert_eq!(encoded(&packet, Version::V1_18_2), expected);
    }

    #[test]
    fn test_chat_message_1_19_unsigned_layout() {
        let packet = ServerboundPacket::ChatMessage {
            message: "hello".to_string(),
            timestamp: 123,
            salt: 456,
            signature: None,
        };
        let mut expected = BytesMut::new();
        write_string(&mut expected, "hello");
        write_i64(&mut expected, 123);
        write_i64(&mut expected, 456);
        write_byte_array(&mut expected, &[]);
        write_bool(&mut expected, false);
        assert_eq!(encoded(&packet, Version::V1_19), expected);

        // 1.19.2 appends the last-seen list (empty) and no-optional marker.
        write_varint(&mut expected, 0);
        write_bool(&mut expected, false);
        assert_eq!(encoded(&packet, Version::V1_19_2), expected);
    }

    #[test]
    fn test_chat_message_1_19_3_unsigned_layout() {
        let packet = ServerboundPacket::ChatMessage {
            message: "hello".to_string(),
            timestamp: 123,
            salt: 456,
            signature: None,
        };
        let mut expected = BytesMut::new();
        write_string(&mut expected, "hello");
        write_i64(&mut expected, 123);
        write_i64(&mut expected, 456);
        write_bool(&mut expected, false);
        write_varint(&mut expected, 0);
        expected.put_slice(&[0u8; 3]);
        assert_eq!(encoded(&packet, Version::V1_19_3), expected);

        // 1.21.5 appends the checksum byte.
        write_u8(&mut expected, 0);
        assert_eq!(encoded(&packet, Version::V1_21_5), expected);
    }

    #[test]
    fn test_chat_message_signed_layout_carries_raw_256_bytes() {
        let sig = vec![0xAB; 256];
        let packet = ServerboundPacket::ChatMessage {
            message: "hi".to_string(),
            timestamp: 1,
            salt: 2,
            signature: Some(sig.clone()),
        };
        let mut buf = encoded(&packet, Version::V1_19_3);
        let _msg = read_string(&mut buf).unwrap();
        let _ts = read_i64(&mut buf).unwrap();
        let _salt = read_i64(&mut buf).unwrap();
        assert!(read_bool(&mut buf).unwrap());
        assert_eq!(&buf[..256], &sig[..]);
    }

    #[test]
    fn test_sign_chat_roundtrip_and_padding() {
        use rand::rngs::OsRng;

        let key = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let uuid = offline_uuid("Tester");
        let sig = sign_chat(&key, Version::V1_19_3, &uuid, "hi", 11, 22).unwrap();
        assert_eq!(sig.len(), 256);

        // Verify against the documented sign-input layout for >= 1.19.2.
        let mut input = Vec::new();
        input.extend_from_slice(&22i64.to_be_bytes());
        input.extend_from_slice(&11i64.to_be_bytes());
        input.extend_from_slice(uuid.as_bytes());
        input.extend_from_slice(b"hi");
        let digest = Sha256::digest(&input);
        key.to_public_key()
            .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &sig)
            .expect("signature must verify");
    }

    #[test]
    fn test_unknown_packet_fields_are_drained_not_parsed() {
        let mut buf = BytesMut::from(&[0xDE, 0xAD, 0xBE, 0xEF][..]);
        let packet =
            ClientboundPacket::decode(ClientboundKind::JoinGame, &mut buf, Version::V1_21_1)
                .unwrap();
        assert_eq!(packet, ClientboundPacket::JoinGame);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_player_position_wire_width() {
        let packet = ServerboundPacket::PlayerPosition {
            x: 1.0,
            y: 64.0,
            z: -1.0,
            yaw: 90.0,
            pitch: 0.0,
            on_ground: true,
        };
        // 3 doubles + 2 floats + bool
        assert_eq!(encoded(&packet, Version::V1_21_1).len(), 33);
    }

    #[test]
    fn test_update_tags_decode_nested() {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, 1);
        write_string(&mut buf, "minecraft:block");
        write_varint(&mut buf, 2);
        write_string(&mut buf, "mineable/pickaxe");
        write_varint(&mut buf, 3);
        write_varint(&mut buf, 7);
        write_varint(&mut buf, 8);
        write_varint(&mut buf, 9);
        write_string(&mut buf, "mineable/axe");
        write_varint(&mut buf, 0);

        let packet =
            ClientboundPacket::decode(ClientboundKind::UpdateTags, &mut buf, Version::V1_21_1)
                .unwrap();
        let ClientboundPacket::UpdateTags { tags } = packet else {
            panic!("wrong packet");
        };
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].registry, "minecraft:block");
        assert_eq!(tags[0].tags[0].entries, vec![7, 8, 9]);
        assert_eq!(tags[0].tags[1].entries, Vec::<i32>::new());
    }
}
