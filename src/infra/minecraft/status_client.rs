use super::{query, slp};
use crate::core::server_error::ServerError;
use crate::core::server_status::{QueryReply, StatusClient, StatusSnapshot};
use async_trait::async_trait;
use std::future::Future;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream, UdpSocket};

/// Status/query/ping client for Java-edition servers.
///
/// Every call resolves, connects and talks to the server inside one timeout.
pub struct JavaStatusClient {
    timeout: Duration,
}

impl JavaStatusClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl StatusClient for JavaStatusClient {
    async fn status(&self, host: &str, port: u16) -> Result<StatusSnapshot, ServerError> {
        within(self.timeout, async {
            let mut stream = connect_tcp(host, port).await?;
            slp::status(&mut stream, host, port).await
        })
        .await
    }

    async fn query(&self, host: &str, port: u16) -> Result<QueryReply, ServerError> {
        within(self.timeout, async {
            let addr = resolve(host, port).await?;
            let local: SocketAddr = if addr.is_ipv4() {
                (Ipv4Addr::UNSPECIFIED, 0).into()
            } else {
                (Ipv6Addr::UNSPECIFIED, 0).into()
            };
            let socket = UdpSocket::bind(local).await.map_err(unreachable)?;
            socket.connect(addr).await.map_err(unreachable)?;
            query::full_stat(&socket).await
        })
        .await
    }

    async fn ping(&self, host: &str, port: u16) -> Result<Duration, ServerError> {
        within(self.timeout, async {
            let mut stream = connect_tcp(host, port).await?;
            slp::ping(&mut stream, host, port).await
        })
        .await
    }
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr, ServerError> {
    lookup_host((host, port))
        .await
        .map_err(unreachable)?
        .next()
        .ok_or_else(|| ServerError::Unreachable(format!("{} did not resolve", host)))
}

async fn connect_tcp(host: &str, port: u16) -> Result<TcpStream, ServerError> {
    let stream = TcpStream::connect((host, port)).await.map_err(unreachable)?;
    stream.set_nodelay(true).map_err(unreachable)?;
    Ok(stream)
}

async fn within<T, F>(limit: Duration, operation: F) -> Result<T, ServerError>
where
    F: Future<Output = Result<T, ServerError>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(ServerError::Unreachable(format!(
            "timed out after {}ms",
            limit.as_millis()
        ))),
    }
}

fn unreachable(err: std::io::Error) -> ServerError {
    ServerError::Unreachable(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::guild_config::GuildConnectionProfile;
    use crate::infra::minecraft::codec::{frame, read_packet, write_string};
    use crate::core::server_status::{PlayerListSource, ServerStatusService};
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    const STATUS_JSON: &str = r#"{"version":{"name":"1.20.4","protocol":765},
        "players":{"max":20,"online":2,"sample":[{"name":"Steve","id":"a"},{"name":"Alex","id":"b"}]},
        "description":{"text":"Test server"}}"#;

    /// Answers one status or ping exchange like a vanilla server would.
    async fn fake_slp_server() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let (id, _) = read_packet(&mut socket).await.unwrap();
            assert_eq!(id, 0x00, "handshake");

            loop {
                let Ok((id, body)) = read_packet(&mut socket).await else {
                    return;
                };
                match id {
                    0x00 => {
                        let mut payload = Vec::new();
                        write_string(&mut payload, STATUS_JSON);
                        socket.write_all(&frame(0x00, &payload)).await.unwrap();
                    }
                    0x01 => {
                        socket.write_all(&frame(0x01, &body)).await.unwrap();
                        return;
                    }
                    other => panic!("unexpected packet {other}"),
                }
            }
        });

        port
    }

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    fn client() -> JavaStatusClient {
        JavaStatusClient::new(Duration::from_millis(500))
    }

    #[tokio::test]
    async fn status_against_fake_server() {
        let port = fake_slp_server().await;
        let snapshot = client().status("127.0.0.1", port).await.unwrap();

        assert!(snapshot.online);
        assert_eq!(snapshot.players_online, 2);
        assert_eq!(snapshot.sample, vec!["Steve", "Alex"]);
        assert_eq!(snapshot.version, "1.20.4");
        assert_eq!(snapshot.motd, "Test server");
    }

    #[tokio::test]
    async fn ping_against_fake_server() {
        let port = fake_slp_server().await;
        let latency = client().ping("127.0.0.1", port).await.unwrap();
        assert!(latency < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let port = closed_port().await;
        let err = client().status("127.0.0.1", port).await.unwrap_err();
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        // Accepts the connection but never answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let err = JavaStatusClient::new(Duration::from_millis(100))
            .status("127.0.0.1", port)
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Unreachable(reason) if reason.contains("timed out")));
    }

    #[tokio::test]
    async fn players_fall_back_when_query_is_disabled() {
        // Nothing listens on UDP, so the query attempt times out or is refused.
        let port = fake_slp_server().await;
        let service = ServerStatusService::new(JavaStatusClient::new(Duration::from_millis(300)));
        let profile = GuildConnectionProfile {
            host: "127.0.0.1".into(),
            port,
            rcon_password: String::new(),
        };

        let players = service.query_players(&profile).await.unwrap();
        assert_eq!(players.source, PlayerListSource::StatusSample);
        assert_eq!(players.names, vec!["Steve", "Alex"]);
        assert_eq!(players.max, 20);
    }

    #[tokio::test]
    async fn query_against_fake_udp_server() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (_, peer) = server.recv_from(&mut buf).await.unwrap();
            let session = i32::from_be_bytes([buf[3], buf[4], buf[5], buf[6]]);
            let mut challenge = vec![0x09];
            challenge.extend_from_slice(&session.to_be_bytes());
            challenge.extend_from_slice(b"12345\x00");
            server.send_to(&challenge, peer).await.unwrap();

            let (_, peer) = server.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[7..11], &12345i32.to_be_bytes());
            let reply = query::tests::stat_reply(session, &["Steve", "Alex", "Herobrine"]);
            server.send_to(&reply, peer).await.unwrap();
        });

        let reply = client().query("127.0.0.1", port).await.unwrap();
        assert_eq!(reply.names, vec!["Steve", "Alex", "Herobrine"]);
        assert_eq!(reply.players_max, 20);
    }
}
