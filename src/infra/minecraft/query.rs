// UDP query protocol (enable-query=true): handshake for a challenge token,
// then a full-stat request that includes every online player's name.

use crate::core::server_error::ServerError;
use crate::core::server_status::QueryReply;
use std::collections::HashMap;
use tokio::net::UdpSocket;

const MAGIC: [u8; 2] = [0xFE, 0xFD];
const TYPE_HANDSHAKE: u8 = 0x09;
const TYPE_STAT: u8 = 0x00;
/// `splitnum\0` + 0x80 0x00 between the header and the key/value section.
const STAT_PADDING: usize = 11;
const PLAYER_MARKER: &[u8] = b"\x01player_\x00\x00";

pub async fn full_stat(socket: &UdpSocket) -> Result<QueryReply, ServerError> {
    let session_id = rand::random::<i32>() & 0x0F0F_0F0F;

    socket
        .send(&request(TYPE_HANDSHAKE, session_id, &[]))
        .await
        .map_err(unreachable)?;
    let mut buf = vec![0u8; 4096];
    let len = socket.recv(&mut buf).await.map_err(unreachable)?;
    let token = parse_challenge(&buf[..len], session_id)?;

    let mut payload = token.to_be_bytes().to_vec();
    payload.extend_from_slice(&[0, 0, 0, 0]);
    socket
        .send(&request(TYPE_STAT, session_id, &payload))
        .await
        .map_err(unreachable)?;
    let mut buf = vec![0u8; 65_536];
    let len = socket.recv(&mut buf).await.map_err(unreachable)?;
    parse_full_stat(&buf[..len], session_id)
}

pub fn request(kind: u8, session_id: i32, payload: &[u8]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(7 + payload.len());
    packet.extend_from_slice(&MAGIC);
    packet.push(kind);
    packet.extend_from_slice(&session_id.to_be_bytes());
    packet.extend_from_slice(payload);
    packet
}

fn check_header(packet: &[u8], kind: u8, session_id: i32) -> Result<&[u8], ServerError> {
    if packet.len() < 5 || packet[0] != kind || packet[1..5] != session_id.to_be_bytes() {
        return Err(ServerError::Protocol("unexpected query reply header".to_string()));
    }
    Ok(&packet[5..])
}

/// The token arrives as a NUL-terminated decimal string.
pub fn parse_challenge(packet: &[u8], session_id: i32) -> Result<i32, ServerError> {
    let body = check_header(packet, TYPE_HANDSHAKE, session_id)?;
    let text = body.split(|b| *b == 0).next().unwrap_or_default();
    std::str::from_utf8(text)
        .ok()
        .and_then(|t| t.trim().parse::<i64>().ok())
        .map(|t| t as i32)
        .ok_or_else(|| ServerError::Protocol("bad challenge token".to_string()))
}

pub fn parse_full_stat(packet: &[u8], session_id: i32) -> Result<QueryReply, ServerError> {
    let body = check_header(packet, TYPE_STAT, session_id)?;
    let body = body
        .get(STAT_PADDING..)
        .ok_or_else(|| ServerError::Protocol("full stat reply too short".to_string()))?;

    let marker = body
        .windows(PLAYER_MARKER.len())
        .position(|w| w == PLAYER_MARKER)
        .ok_or_else(|| ServerError::Protocol("player section missing".to_string()))?;

    let mut fields = HashMap::new();
    let mut parts = body[..marker].split(|b| *b == 0);
    while let (Some(key), Some(value)) = (parts.next(), parts.next()) {
        if key.is_empty() {
            break;
        }
        fields.insert(
            String::from_utf8_lossy(key).into_owned(),
            String::from_utf8_lossy(value).into_owned(),
        );
    }

    let names: Vec<String> = body[marker + PLAYER_MARKER.len()..]
        .split(|b| *b == 0)
        .take_while(|name| !name.is_empty())
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect();

    let number = |key: &str| fields.get(key).and_then(|v| v.parse::<u32>().ok());
    Ok(QueryReply {
        players_online: number("numplayers").unwrap_or(names.len() as u32),
        players_max: number("maxplayers").unwrap_or_default(),
        names,
    })
}

fn unreachable(err: std::io::Error) -> ServerError {
    ServerError::Unreachable(err.to_string())
}
