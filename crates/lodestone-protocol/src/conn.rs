use crate::codec::{read_varint, varint_len, write_varint, CodecError, MAX_VARINT_LEN};
use crate::packets::{ClientboundPacket, ServerboundKind, ServerboundPacket};
use crate::registry;
use crate::state::State;
use crate::version::Version;
use bytes::BytesMut;
use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use std::io::Write as _;
use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{trace, warn};

/// Frames longer than this are rejected before buffering.
const MAX_FRAME_LEN: usize = 2_097_152;

/// Upper bound on a declared pre-compression data length.
const MAX_INFLATED_LEN: usize = 8 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame length {0} out of bounds")]
    FrameLength(i32),
    #[error("inflated payload is {got} bytes, expected {expected}")]
    InflateMismatch { expected: usize, got: usize },
    #[error("inflate: {0}")]
    Inflate(#[from] flate2::DecompressError),
    #[error("unknown packet id 0x{id:02X} in state {state}")]
    UnknownPacket { state: State, id: i32 },
    #[error("no id for {kind} in state {state} (version {version})")]
    UnregisteredPacket {
        kind: ServerboundKind,
        state: State,
        version: Version,
    },
}

impl ProtocolError {
    /// True for the recoverable unknown-id signal: the frame was drained
    /// and the connection is still usable.
    pub fn is_unknown_packet(&self) -> bool {
        matches!(self, ProtocolError::UnknownPacket { .. })
    }
}

/// A framed protocol stream over TCP.
///
/// The version is fixed for the connection's lifetime; the state and the
/// compression threshold advance as the session controller drives the
/// handshake. Reads and writes are guarded by separate locks so one reader
/// and one writer proceed in parallel while duplicates serialize.
pub struct Connection {
    version: Version,
    state: AtomicU8,
    /// Negative while compression is off. Once enabled it never rolls back.
    compression: AtomicI32,
    reader: Mutex<FrameReader>,
    writer: Mutex<FrameWriter>,
}

impl Connection {
    pub fn new(stream: TcpStream, version: Version) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            version,
            state: AtomicU8::new(State::Handshaking as u8),
            compression: AtomicI32::new(-1),
            reader: Mutex::new(FrameReader {
                stream: read_half,
                frame_buf: BytesMut::with_capacity(4096),
                inflater: Decompress::new(true),
            }),
            writer: Mutex::new(FrameWriter { stream: write_half }),
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn state(&self) -> State {
        State::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: State) {
        trace!("state {} -> {}", self.state(), state);
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn compression_threshold(&self) -> Option<i32> {
        let threshold = self.compression.load(Ordering::Acquire);
        (threshold >= 0).then_some(threshold)
    }

    /// Enable compression, or update the threshold if already enabled.
    /// Disabling is not a transition the protocol has; a negative threshold
    /// after enablement is ignored.
    pub fn set_compression(&self, threshold: i32) {
        if threshold < 0 {
            if self.compression.load(Ordering::Acquire) >= 0 {
                warn!("ignoring attempt to disable compression (threshold {})", threshold);
            }
            return;
        }
        self.compression.store(threshold, Ordering::Release);
    }

    /// Read one clientbound packet.
    ///
    /// An id missing from the registry yields [`ProtocolError::UnknownPacket`]
    /// after the frame is drained; the connection stays usable and the
    /// caller decides whether to skip or surface it.
    pub async fn read_packet(&self) -> Result<ClientboundPacket, ProtocolError> {
        let compression = self.compression_threshold().is_some();
        let mut reader = self.reader.lock().await;
        let mut envelope = reader.read_envelope(compression).await?;

        let packet_id = read_varint(&mut envelope)?;
        let state = self.state();
        let Some(kind) = registry::clientbound_kind(self.version, state, packet_id) else {
            trace!("S->C {} 0x{:02X} ({} bytes) ignored", state, packet_id, envelope.len());
            return Err(ProtocolError::UnknownPacket {
                state,
                id: packet_id,
            });
        };

        let packet = ClientboundPacket::decode(kind, &mut envelope, self.version)?;
        trace!("S->C {} 0x{:02X} {}", state, packet_id, kind);
        Ok(packet)
    }

    /// Write one serverbound packet under the current (version, state).
    ///
    /// A shape without a registered id here is a programmer error and fails
    /// synchronously, before any bytes hit the wire.
    pub async fn write_packet(&self, packet: &ServerboundPacket) -> Result<(), ProtocolError> {
        let state = self.state();
        let kind = packet.kind();
        let packet_id = registry::serverbound_id(self.version, state, kind).ok_or(
            ProtocolError::UnregisteredPacket {
                kind,
                state,
                version: self.version,
            },
        )?;

        let mut data = BytesMut::new();
        write_varint(&mut data, packet_id);
        packet.encode(&mut data, self.version)?;

        let threshold = self.compression_threshold();
        let mut writer = self.writer.lock().await;
        writer.write_frame(&data, threshold).await?;
        trace!("C->S {} 0x{:02X} {}", state, packet_id, kind);
        Ok(())
    }

    /// Shut down the write half. The read half unblocks with EOF once the
    /// server closes its side.
    pub async fn close(&self) -> Result<(), ProtocolError> {
        let mut writer = self.writer.lock().await;
        writer.stream.shutdown().await?;
        Ok(())
    }
}

struct FrameReader {
    stream: OwnedReadHalf,
    /// Scratch for the raw frame, reused across packets.
    frame_buf: BytesMut,
    /// Reset between frames, never recreated.
    inflater: Decompress,
}

impl FrameReader {
    /// Read one frame and strip the compression sub-envelope, leaving
    /// `VarInt(id) || payload`.
    async fn read_envelope(&mut self, compression: bool) -> Result<BytesMut, ProtocolError> {
        let frame_len = read_varint_stream(&mut self.stream).await?;
        if frame_len < 0 || frame_len as usize > MAX_FRAME_LEN {
            return Err(ProtocolError::FrameLength(frame_len));
        }
        let frame_len = frame_len as usize;

        self.frame_buf.clear();
        self.frame_buf.resize(frame_len, 0);
        self.stream.read_exact(&mut self.frame_buf[..]).await?;

        unwrap_envelope(
            self.frame_buf.split_to(frame_len),
            compression,
            &mut self.inflater,
        )
    }
}

struct FrameWriter {
    stream: OwnedWriteHalf,
}

impl FrameWriter {
    async fn write_frame(
        &mut self,
        data: &[u8],
        threshold: Option<i32>,
    ) -> Result<(), ProtocolError> {
        let frame = build_frame(data, threshold)?;
        self.stream.write_all(&frame).await?;
        Ok(())
    }
}

/// Read a VarInt one byte at a time off the transport.
async fn read_varint_stream(stream: &mut OwnedReadHalf) -> Result<i32, ProtocolError> {
    let mut value: u32 = 0;
    for i in 0..MAX_VARINT_LEN {
        let byte = stream.read_u8().await?;
        value |= ((byte & 0x7F) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value as i32);
        }
    }
    Err(CodecError::VarIntTooBig.into())
}

/// Wrap `VarInt(id) || payload` bytes into a complete wire frame, applying
/// the compressed frame shape once a threshold is set. A fresh compressor
/// per frame is deliberate; only the reader's inflater is pooled.
fn build_frame(data: &[u8], threshold: Option<i32>) -> Result<BytesMut, ProtocolError> {
    let mut frame = BytesMut::with_capacity(data.len() + 8);
    match threshold {
        Some(threshold) if data.len() as i32 >= threshold => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            let compressed = encoder.finish()?;

            let data_len = data.len() as i32;
            write_varint(&mut frame, varint_len(data_len) as i32 + compressed.len() as i32);
            write_varint(&mut frame, data_len);
            frame.extend_from_slice(&compressed);
        }
        Some(_) => {
            write_varint(&mut frame, 1 + data.len() as i32);
            write_varint(&mut frame, 0);
            frame.extend_from_slice(data);
        }
        None => {
            write_varint(&mut frame, data.len() as i32);
            frame.extend_from_slice(data);
        }
    }
    Ok(frame)
}

/// Invert the compression sub-envelope of a frame body (everything after
/// the outer length prefix).
fn unwrap_envelope(
    mut body: BytesMut,
    compression: bool,
    inflater: &mut Decompress,
) -> Result<BytesMut, ProtocolError> {
    if !compression {
        return Ok(body);
    }

    let data_len = read_varint(&mut body)?;
    if data_len == 0 {
        return Ok(body);
    }
    if data_len < 0 || data_len as usize > MAX_INFLATED_LEN {
        return Err(ProtocolError::FrameLength(data_len));
    }
    let expected = data_len as usize;

    let mut inflated = BytesMut::new();
    inflated.resize(expected, 0);
    inflater.reset(true);
    let status = inflater.decompress(&body, &mut inflated, FlushDecompress::Finish)?;
    let produced = inflater.total_out() as usize;
    if produced != expected || status != Status::StreamEnd {
        return Err(ProtocolError::InflateMismatch {
            expected,
            got: produced,
        });
    }
    Ok(inflated)
}
