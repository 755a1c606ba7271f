// Java-edition Server List Ping: handshake (next state = status), status
// request/response, then ping/pong for latency.

use super::codec::{decode_string, frame, read_packet, write_string, write_varint};
use crate::core::server_error::ServerError;
use crate::core::server_status::StatusSnapshot;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

const PROTOCOL_VERSION: i32 = 47;
const NEXT_STATE_STATUS: i32 = 1;

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    version: Option<VersionInfo>,
    #[serde(default)]
    players: Option<PlayersInfo>,
    #[serde(default)]
    description: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct VersionInfo {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct PlayersInfo {
    #[serde(default)]
    max: u32,
    #[serde(default)]
    online: u32,
    #[serde(default)]
    sample: Option<Vec<SamplePlayer>>,
}

#[derive(Debug, Deserialize)]
struct SamplePlayer {
    name: String,
}

pub fn handshake(host: &str, port: u16) -> Vec<u8> {
    let mut payload = Vec::new();
    write_varint(&mut payload, PROTOCOL_VERSION);
    write_string(&mut payload, host);
    payload.extend_from_slice(&port.to_be_bytes());
    write_varint(&mut payload, NEXT_STATE_STATUS);
    frame(0x00, &payload)
}

/// Full status exchange on an already-connected stream.
pub async fn status<S>(stream: &mut S, host: &str, port: u16) -> Result<StatusSnapshot, ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut request = handshake(host, port);
    request.extend_from_slice(&frame(0x00, &[]));
    stream.write_all(&request).await.map_err(transport)?;

    let (id, body) = read_packet(stream).await.map_err(transport)?;
    if id != 0x00 {
        return Err(ServerError::Protocol(format!(
            "expected status response, got packet {:#04x}",
            id
        )));
    }
    let json = decode_string(&body)
        .ok_or_else(|| ServerError::Protocol("status response is not a string".to_string()))?;
    let mut snapshot = parse_status_json(&json)?;

    snapshot.latency = ping_pong(stream).await?;
    Ok(snapshot)
}

/// Handshake followed directly by ping/pong.
pub async fn ping<S>(stream: &mut S, host: &str, port: u16) -> Result<Duration, ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream
        .write_all(&handshake(host, port))
        .await
        .map_err(transport)?;
    ping_pong(stream).await
}

async fn ping_pong<S>(stream: &mut S) -> Result<Duration, ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let token: i64 = rand::random();
    let started = Instant::now();
    stream
        .write_all(&frame(0x01, &token.to_be_bytes()))
        .await
        .map_err(transport)?;

    let (id, body) = read_packet(stream).await.map_err(transport)?;
    let elapsed = started.elapsed();
    if id != 0x01 || body.len() != 8 {
        return Err(ServerError::Protocol("malformed pong".to_string()));
    }
    let mut echoed = [0u8; 8];
    echoed.copy_from_slice(&body);
    if i64::from_be_bytes(echoed) != token {
        return Err(ServerError::Protocol("pong payload mismatch".to_string()));
    }
    Ok(elapsed)
}

pub fn parse_status_json(json: &str) -> Result<StatusSnapshot, ServerError> {
    let response: StatusResponse = serde_json::from_str(json)
        .map_err(|e| ServerError::Protocol(format!("invalid status json: {}", e)))?;

    let players = response.players.unwrap_or(PlayersInfo {
        max: 0,
        online: 0,
        sample: None,
    });

    Ok(StatusSnapshot {
        online: true,
        players_online: players.online,
        players_max: players.max,
        sample: players
            .sample
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.name)
            .collect(),
        version: response.version.map(|v| v.name).unwrap_or_default(),
        motd: response
            .description
            .as_ref()
            .map(flatten_chat)
            .map(|text| strip_formatting(&text))
            .unwrap_or_default(),
        latency: Duration::ZERO,
    })
}

/// Chat components come as a plain string or `{text, extra: [...]}` trees.
fn flatten_chat(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Array(parts) => parts.iter().map(flatten_chat).collect(),
        serde_json::Value::Object(map) => {
            let mut text = map
                .get("text")
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string();
            if let Some(extra) = map.get("extra") {
                text.push_str(&flatten_chat(extra));
            }
            text
        }
        _ => String::new(),
    }
}

/// Drop legacy `§x` colour/format codes.
fn strip_formatting(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '§' {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

fn transport(err: std::io::Error) -> ServerError {
    match err.kind() {
        std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof => {
            ServerError::Protocol(err.to_string())
        }
        _ => ServerError::Unreachable(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vanilla_status() {
        let json = r#"{
            "version": {"name": "1.20.4", "protocol": 765},
            "players": {"max": 20, "online": 2, "sample": [
                {"name": "Steve", "id": "00000000-0000-0000-0000-000000000001"},
                {"name": "Alex", "id": "00000000-0000-0000-0000-000000000002"}
            ]},
            "description": {"text": "§aHello ", "extra": [{"text": "world"}]}
        }"#;

        let snapshot = parse_status_json(json).unwrap();
        assert!(snapshot.online);
        assert_eq!(snapshot.players_online, 2);
        assert_eq!(snapshot.players_max, 20);
        assert_eq!(snapshot.sample, vec!["Steve", "Alex"]);
        assert_eq!(snapshot.version, "1.20.4");
        assert_eq!(snapshot.motd, "Hello world");
    }

    #[test]
    fn missing_sample_is_empty() {
        let json = r#"{"version": {"name": "Paper 1.21"}, "players": {"max": 100, "online": 0},
                       "description": "A Minecraft Server"}"#;
        let snapshot = parse_status_json(json).unwrap();
        assert!(snapshot.sample.is_empty());
        assert_eq!(snapshot.motd, "A Minecraft Server");
    }

    #[test]
    fn garbage_is_a_protocol_error() {
        assert!(matches!(
            parse_status_json("<html>"),
            Err(ServerError::Protocol(_))
        ));
    }

    #[test]
    fn handshake_layout() {
        let packet = handshake("localhost", 25565);
        // length, id 0, protocol 47, "localhost", port, next state
        assert_eq!(packet[1], 0x00);
        assert_eq!(packet[2], 47);
        assert_eq!(packet[3] as usize, "localhost".len());
        assert_eq!(&packet[4..13], b"localhost");
        assert_eq!(&packet[13..15], &25565u16.to_be_bytes());
        assert_eq!(packet[15], NEXT_STATE_STATUS as u8);
        assert_eq!(packet[0] as usize, packet.len() - 1);
    }
}
