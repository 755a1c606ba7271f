// VarInt-framed packets used by the Java-edition handshake/status protocol.

use tokio::io::{AsyncRead, AsyncReadExt};

/// Status replies carry a JSON blob with favicons; anything past this is junk.
pub const MAX_PACKET_LEN: usize = 2 * 1024 * 1024;

pub fn write_varint(buf: &mut Vec<u8>, value: i32) {
    let mut value = value as u32;
    loop {
        if value & !0x7F == 0 {
            buf.push(value as u8);
            return;
        }
        buf.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
}

pub fn write_string(buf: &mut Vec<u8>, value: &str) {
    write_varint(buf, value.len() as i32);
    buf.extend_from_slice(value.as_bytes());
}

/// Decode a VarInt from the front of `bytes`, returning it and its width.
pub fn decode_varint(bytes: &[u8]) -> Option<(i32, usize)> {
    let mut result: u32 = 0;
    for (i, byte) in bytes.iter().take(5).enumerate() {
        result |= ((byte & 0x7F) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((result as i32, i + 1));
        }
    }
    None
}

pub async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<i32> {
    let mut result: u32 = 0;
    for i in 0..5 {
        let byte = reader.read_u8().await?;
        result |= ((byte & 0x7F) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result as i32);
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        "VarInt is too long",
    ))
}

/// Length-prefix `packet_id + payload`.
pub fn frame(packet_id: i32, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(payload.len() + 5);
    write_varint(&mut body, packet_id);
    body.extend_from_slice(payload);

    let mut packet = Vec::with_capacity(body.len() + 5);
    write_varint(&mut packet, body.len() as i32);
    packet.extend_from_slice(&body);
    packet
}

/// Read one framed packet, returning its id and the bytes after the id.
pub async fn read_packet<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<(i32, Vec<u8>)> {
    let len = read_varint(reader).await?;
    if len <= 0 || len as usize > MAX_PACKET_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("bad packet length {}", len),
        ));
    }

    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;

    let (id, width) = decode_varint(&body).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, "bad packet id")
    })?;
    body.drain(..width);
    Ok((id, body))
}

/// Read a VarInt-prefixed UTF-8 string from the front of `bytes`.
pub fn decode_string(bytes: &[u8]) -> Option<String> {
    let (len, width) = decode_varint(bytes)?;
    let len = usize::try_from(len).ok()?;
    let raw = bytes.get(width..width + len)?;
    String::from_utf8(raw.to_vec()).ok()
}
