//! Network module.
//!
//! Establishes the outbound TLS connection to the chat server, frames the
//! inbound byte stream into lines, and runs the writer task that drains the
//! outbound queue. The session layer never touches the wire directly: it
//! reads parsed lines and pushes text into the queue.

use crate::config::BotConfig;
use anyhow::Context as _;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{error, info, warn};
use warden_proto::encode;

/// Capabilities requested at login; tags carry the sender metadata the
/// parser needs, commands enable the moderation slash-commands.
const CAPABILITIES: &[&str] = &["twitch.tv/tags", "twitch.tv/commands"];

/// How many outbound lines may queue before producers are backpressured.
const OUTBOUND_QUEUE_SIZE: usize = 256;

/// An established chat server connection.
pub struct Connection {
    /// Inbound protocol lines, one at a time.
    pub lines: FramedRead<tokio::io::ReadHalf<TlsStream<TcpStream>>, LinesCodec>,
    /// Producer side of the outbound queue; cloned by the messenger and the
    /// timer engine.
    pub outbound: mpsc::Sender<String>,
}

/// Connect to the chat server over TLS and start the writer task.
pub async fn connect(config: &BotConfig) -> anyhow::Result<Connection> {
    let tcp = TcpStream::connect(&config.server_addr)
        .await
        .with_context(|| format!("connecting to {}", config.server_addr))?;
    let tls = upgrade_to_tls(tcp, config.server_host()).await?;
    info!(server = %config.server_addr, "Connected to chat server");

    let (read_half, write_half) = tokio::io::split(tls);
    let lines = FramedRead::new(read_half, LinesCodec::new());

    let (outbound, rx) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
    spawn_writer_task(write_half, rx);

    Ok(Connection { lines, outbound })
}

/// Send the login burst: authenticate, name ourselves, request
/// capabilities, join the channel.
pub async fn login(outbound: &mpsc::Sender<String>, config: &BotConfig) -> anyhow::Result<()> {
    for line in [
        encode::pass(&config.oauth_token),
        encode::nick(&config.name),
        encode::cap_req(CAPABILITIES),
        encode::join(&config.channel),
    ] {
        outbound
            .send(line)
            .await
            .map_err(|_| anyhow::anyhow!("outbound channel closed during login"))?;
    }
    info!(channel = %config.channel, name = %config.name, "Login burst queued");
    Ok(())
}

/// Upgrade a TCP stream to TLS using the system root certificates.
async fn upgrade_to_tls(
    tcp_stream: TcpStream,
    hostname: &str,
) -> anyhow::Result<TlsStream<TcpStream>> {
    let mut roots = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs();
    for cert in certs.certs {
        if let Err(e) = roots.add(cert) {
            warn!("Failed to add root cert: {}", e);
        }
    }
    for e in &certs.errors {
        warn!("Error loading native certs: {}", e);
    }

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let connector = TlsConnector::from(Arc::new(config));
    let server_name = ServerName::try_from(hostname.to_string())
        .with_context(|| format!("invalid server name: {hostname}"))?;

    Ok(connector.connect(server_name, tcp_stream).await?)
}

/// Drain the outbound queue onto the wire, one CRLF-terminated line per
/// queued message. The single consumer preserves each producer's ordering.
fn spawn_writer_task(
    mut write_half: WriteHalf<TlsStream<TcpStream>>,
    mut rx: mpsc::Receiver<String>,
) {
    tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            let framed = format!("{line}\r\n");
            if let Err(e) = write_half.write_all(framed.as_bytes()).await {
                error!(error = %e, "Write to chat server failed; dropping outbound queue");
                break;
            }
        }
    });
}
