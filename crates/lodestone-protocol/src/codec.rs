use bytes::{Buf, BufMut, BytesMut};
use sha1::{Digest, Sha1};
use thiserror::Error;
use uuid::Uuid;

/// Largest on-wire VarInt, in bytes.
pub const MAX_VARINT_LEN: usize = 5;

/// Upper bound on VarInt-prefixed strings and byte arrays.
pub const MAX_DATA_LEN: usize = 2_097_152;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("VarInt too big")]
    VarIntTooBig,
    #[error("not enough data")]
    NotEnoughData,
    #[error("length {0} exceeds maximum {1}")]
    LengthTooLong(usize, usize),
    #[error("negative length: {0}")]
    NegativeLength(i32),
    #[error("malformed UUID string: {0}")]
    InvalidUuid(String),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Read a VarInt from the buffer.
pub fn read_varint(buf: &mut BytesMut) -> CodecResult<i32> {
    let mut result: u32 = 0;
    for i in 0..MAX_VARINT_LEN {
        if !buf.has_remaining() {
            return Err(CodecError::NotEnoughData);
        }
        let byte = buf.get_u8();
        result |= ((byte & 0x7F) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result as i32);
        }
    }
    Err(CodecError::VarIntTooBig)
}

/// Write a VarInt to the buffer.
pub fn write_varint(buf: &mut BytesMut, value: i32) {
    let mut val = value as u32;
    loop {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;
        if val != 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        if val == 0 {
            break;
        }
    }
}

/// Calculate the byte length of a VarInt.
pub fn varint_len(value: i32) -> usize {
    let mut val = value as u32;
    let mut len = 0;
    loop {
        len += 1;
        val >>= 7;
        if val == 0 {
            break;
        }
    }
    len
}

/// Read a protocol string (VarInt-prefixed UTF-8).
pub fn read_string(buf: &mut BytesMut) -> CodecResult<String> {
    let bytes = read_byte_array(buf)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write a protocol string.
pub fn write_string(buf: &mut BytesMut, s: &str) {
    write_varint(buf, s.len() as i32);
    buf.put_slice(s.as_bytes());
}

/// Read a VarInt-prefixed byte array.
pub fn read_byte_array(buf: &mut BytesMut) -> CodecResult<Vec<u8>> {
    let len = read_varint(buf)?;
    if len < 0 {
        return Err(CodecError::NegativeLength(len));
    }
    let len = len as usize;
    if len > MAX_DATA_LEN {
        return Err(CodecError::LengthTooLong(len, MAX_DATA_LEN));
    }
    if buf.remaining() < len {
        return Err(CodecError::NotEnoughData);
    }
    Ok(buf.split_to(len).to_vec())
}

/// Write a VarInt-prefixed byte array.
pub fn write_byte_array(buf: &mut BytesMut, data: &[u8]) {
    write_varint(buf, data.len() as i32);
    buf.put_slice(data);
}

pub fn read_u8(buf: &mut BytesMut) -> CodecResult<u8> {
    if !buf.has_remaining() {
        return Err(CodecError::NotEnoughData);
    }
    Ok(buf.get_u8())
}

pub fn write_u8(buf: &mut BytesMut, v: u8) {
    buf.put_u8(v);
}

/// Any non-zero byte reads as true; writers emit 0 or 1.
pub fn read_bool(buf: &mut BytesMut) -> CodecResult<bool> {
    Ok(read_u8(buf)? != 0)
}

pub fn write_bool(buf: &mut BytesMut, v: bool) {
    buf.put_u8(v as u8);
}

pub fn read_u16(buf: &mut BytesMut) -> CodecResult<u16> {
    if buf.remaining() < 2 {
        return Err(CodecError::NotEnoughData);
    }
    Ok(buf.get_u16())
}

pub fn write_u16(buf: &mut BytesMut, v: u16) {
    buf.put_u16(v);
}

pub fn read_i32(buf: &mut BytesMut) -> CodecResult<i32> {
    if buf.remaining() < 4 {
        return Err(CodecError::NotEnoughData);
    }
    Ok(buf.get_i32())
}

pub fn write_i32(buf: &mut BytesMut, v: i32) {
    buf.put_i32(v);
}

pub fn read_i64(buf: &mut BytesMut) -> CodecResult<i64> {
    if buf.remaining() < 8 {
        return Err(CodecError::NotEnoughData);
    }
    Ok(buf.get_i64())
}

pub fn write_i64(buf: &mut BytesMut, v: i64) {
    buf.put_i64(v);
}

pub fn read_f32(buf: &mut BytesMut) -> CodecResult<f32> {
    if buf.remaining() < 4 {
        return Err(CodecError::NotEnoughData);
    }
    Ok(buf.get_f32())
}

pub fn write_f32(buf: &mut BytesMut, v: f32) {
    buf.put_f32(v);
}

pub fn read_f64(buf: &mut BytesMut) -> CodecResult<f64> {
    if buf.remaining() < 8 {
        return Err(CodecError::NotEnoughData);
    }
    Ok(buf.get_f64())
}

pub fn write_f64(buf: &mut BytesMut, v: f64) {
    buf.put_f64(v);
}

/// Read a UUID as 16 raw bytes, big endian.
pub fn read_uuid(buf: &mut BytesMut) -> CodecResult<Uuid> {
    if buf.remaining() < 16 {
        return Err(CodecError::NotEnoughData);
    }
    let mut bytes = [0u8; 16];
    buf.copy_to_slice(&mut bytes);
    Ok(Uuid::from_bytes(bytes))
}

/// Write a UUID as 16 raw bytes.
pub fn write_uuid(buf: &mut BytesMut, uuid: &Uuid) {
    buf.put_slice(uuid.as_bytes());
}

/// Read a UUID in string form: either canonical 8-4-4-4-12 or 32 bare hex
/// digits (pre-1.16 servers send both).
pub fn read_string_uuid(buf: &mut BytesMut) -> CodecResult<Uuid> {
    let s = read_string(buf)?;
    Uuid::parse_str(&s).map_err(|_| CodecError::InvalidUuid(s))
}

/// Derive the offline-mode UUID for a username: SHA-1 of
/// `"OfflinePlayer:" + username` truncated to 16 bytes, with the RFC 4122
/// version-3 and variant-1 bits imposed.
pub fn offline_uuid(username: &str) -> Uuid {
    let mut hasher = Sha1::new();
    hasher.update(b"OfflinePlayer:");
    hasher.update(username.as_bytes());
    let hash = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);
    bytes[6] = (bytes[6] & 0x0F) | 0x30;
    bytes[8] = (bytes[8] & 0x3F) | 0x80;
    Uuid::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_roundtrip() {
        let test_cases = vec![
            (0, vec![0x00]),
            (1, vec![0x01]),
            (127, vec![0x7F]),
            (128, vec![0x80, 0x01]),
            (255, vec![0xFF, 0x01]),
            (25565, vec![0xDD, 0xC7, 0x01]),
            (2097151, vec![0xFF, 0xFF, 0x7F]),
            (i32::MAX, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x07]),
            (-1, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
            (i32::MIN, vec![0x80, 0x80, 0x80, 0x80, 0x08]),
        ];

        for (value, expected_bytes) in test_cases {
            let mut buf = BytesMut::new();
            write_varint(&mut buf, value);
            assert_eq!(buf.to_vec(), expected_bytes, "write_varint({}) failed", value);

            let mut buf = BytesMut::from(&expected_bytes[..]);
            let result = read_varint(&mut buf).unwrap();
            assert_eq!(result, value, "read_varint for {} failed", value);
        }
    }

    #[test]
    fn test_varint_max_encodes_in_five_bytes() {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, i32::MAX);
        assert_eq!(buf.len(), 5);
        assert_eq!(varint_len(i32::MAX), 5);
    }

    #[test]
    fn test_varint_six_bytes_fails() {
        let mut buf = BytesMut::from(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01][..]);
        assert!(matches!(read_varint(&mut buf), Err(CodecError::VarIntTooBig)));
    }

    #[test]
    fn test_varint_truncated_fails() {
        let mut buf = BytesMut::from(&[0x80, 0x80][..]);
        assert!(matches!(read_varint(&mut buf), Err(CodecError::NotEnoughData)));
    }

    #[test]
    fn test_varint_len() {
        assert_eq!(varint_len(0), 1);
        assert_eq!(varint_len(127), 1);
        assert_eq!(varint_len(128), 2);
        assert_eq!(varint_len(25565), 3);
        assert_eq!(varint_len(-1), 5);
    }

    #[test]
    fn test_string_roundtrip() {
        let test_str = "Hello, Minecraft!";
        let mut buf = BytesMut::new();
        write_string(&mut buf, test_str);
        let result = read_string(&mut buf).unwrap();
        assert_eq!(result, test_str);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_string_oversize_rejected() {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, (MAX_DATA_LEN + 1) as i32);
        assert!(matches!(
            read_string(&mut buf),
            Err(CodecError::LengthTooLong(..))
        ));
    }

    #[test]
    fn test_string_negative_length_rejected() {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, -1);
        assert!(matches!(
            read_string(&mut buf),
            Err(CodecError::NegativeLength(-1))
        ));
    }

    #[test]
    fn test_bool_nonzero_reads_true() {
        let mut buf = BytesMut::from(&[0x02][..]);
        assert!(read_bool(&mut buf).unwrap());
        let mut buf = BytesMut::from(&[0x00][..]);
        assert!(!read_bool(&mut buf).unwrap());
    }

    #[test]
    fn test_uuid_roundtrip() {
        let uuid = Uuid::new_v4();
        let mut buf = BytesMut::new();
        write_uuid(&mut buf, &uuid);
        let result = read_uuid(&mut buf).unwrap();
        assert_eq!(result, uuid);
    }

    #[test]
    fn test_string_uuid_both_forms() {
        let uuid = Uuid::parse_str("27bf07bd-e4b4-34bf-b9fc-34856b28fbb4").unwrap();

        let mut buf = BytesMut::new();
        write_string(&mut buf, "27bf07bd-e4b4-34bf-b9fc-34856b28fbb4");
        assert_eq!(read_string_uuid(&mut buf).unwrap(), uuid);

        let mut buf = BytesMut::new();
        write_string(&mut buf, "27bf07bde4b434bfb9fc34856b28fbb4");
        assert_eq!(read_string_uuid(&mut buf).unwrap(), uuid);
    }

    #[test]
    fn test_offline_uuid_known_vectors() {
        assert_eq!(
            offline_uuid("jeb_").to_string(),
            "27bf07bd-e4b4-34bf-b9fc-34856b28fbb4"
        );
        assert_eq!(
            offline_uuid("Notch").to_string(),
            "331eaa63-f8a4-31a0-bee0-1aacd6f24434"
        );
    }

    #[test]
    fn test_offline_uuid_version_and_variant_bits() {
        let uuid = offline_uuid("AnyNameAtAll");
        let bytes = uuid.as_bytes();
        assert_eq!(bytes[6] >> 4, 0x3, "version nibble must be 3");
        assert_eq!(bytes[8] >> 6, 0b10, "variant bits must be RFC 4122");
    }

    #[test]
    fn test_fixed_numerics_big_endian() {
        let mut buf = BytesMut::new();
        write_u16(&mut buf, 25565);
        write_i64(&mut buf, 0x0123456789ABCDEF);
        assert_eq!(&buf[..2], &[0x63, 0xDD]);
        assert_eq!(&buf[2..10], &[0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF]);
        assert_eq!(read_u16(&mut buf).unwrap(), 25565);
        assert_eq!(read_i64(&mut buf).unwrap(), 0x0123456789ABCDEF);
    }
}
