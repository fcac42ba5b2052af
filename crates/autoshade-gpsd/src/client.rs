//! Async gpsd TCP client

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::protocol::{GpsdMessage, Tpv, parse_line};
use crate::{WATCH_DISABLE, WATCH_ENABLE};

/// gpsd client errors
#[derive(Debug, Error)]
pub enum GpsdError {
    #[error("cannot connect to gpsd at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("gpsd IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("gpsd protocol error: {0}")]
    Protocol(#[from] serde_json::Error),
}

/// Connected, watching gpsd session
pub struct GpsdClient {
    stream: TcpStream,
    addr: String,
}

impl GpsdClient {
    /// Connect to gpsd and enable the JSON watcher stream.
    pub async fn connect(host: &str, port: u16) -> Result<Self, GpsdError> {
        let addr = format!("{}:{}", host, port);
        let mut stream = TcpStream::connect(&addr)
            .await
            .map_err(|source| GpsdError::Connect {
                addr: addr.clone(),
                source,
            })?;

        stream.write_all(WATCH_ENABLE.as_bytes()).await?;
        stream.flush().await?;
        log::info!("Watching gpsd at {}", addr);

        Ok(Self { stream, addr })
    }

    /// Address this client is connected to
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Move the session onto `handle` and forward every TPV report to the
    /// returned stream. Returns immediately.
    pub fn spawn_reports(self, handle: &Handle) -> ReportStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let addr = self.addr.clone();
        handle.spawn(async move {
            read_reports(self.stream, tx).await;
            log::warn!("gpsd stream from {} ended", addr);
        });
        ReportStream { rx }
    }
}

async fn read_reports(stream: TcpStream, tx: mpsc::UnboundedSender<Tpv>) {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break, // Connection closed
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_line(trimmed) {
                    Ok(GpsdMessage::Tpv(tpv)) => {
                        if tx.send(tpv).is_err() {
                            // Receiver dropped, nobody is listening any more
                            break;
                        }
                    }
                    Ok(GpsdMessage::Version { release, .. }) => {
                        log::info!("gpsd release {}", release);
                    }
                    Ok(other) => {
                        log::trace!("gpsd: {:?}", other);
                    }
                    Err(e) => {
                        log::warn!("GPS Data Reading Error: {}", e);
                    }
                }
            }
            Err(e) => {
                log::warn!("GPS Data Reading Error: {}", e);
                break;
            }
        }
    }

    // Best effort; the socket may already be gone
    let _ = reader.get_mut().write_all(WATCH_DISABLE.as_bytes()).await;
}

/// Receiving end of a gpsd session. Never blocks.
pub struct ReportStream {
    rx: mpsc::UnboundedReceiver<Tpv>,
}

impl ReportStream {
    /// Build a stream from an existing channel (used by tests and replay)
    pub fn from_receiver(rx: mpsc::UnboundedReceiver<Tpv>) -> Self {
        Self { rx }
    }

    /// Next buffered report, or `None` if nothing new has arrived.
    pub fn try_next(&mut self) -> Option<Tpv> {
        match self.rx.try_recv() {
            Ok(tpv) => Some(tpv),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Most recent buffered report, discarding older ones.
    pub fn drain_latest(&mut self) -> Option<Tpv> {
        let mut latest = None;
        while let Some(tpv) = self.try_next() {
            latest = Some(tpv);
        }
        latest
    }

    /// Whether the reader task has stopped and everything was consumed
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed() && self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_streams_tpv_reports_from_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; WATCH_ENABLE.len()];
            socket.read_exact(&mut buf).await.unwrap();
            assert_eq!(buf, WATCH_ENABLE.as_bytes());

            let lines = concat!(
                "{\"class\":\"VERSION\",\"release\":\"3.22\",\"proto_major\":3,\"proto_minor\":14}\n",
                "{\"class\":\"SKY\",\"satellites\":[]}\n",
                "garbage\n",
                "{\"class\":\"TPV\",\"mode\":3,\"lat\":40.0,\"lon\":-83.0,\"altMSL\":200.0,\"track\":90.0}\n",
                "{\"class\":\"TPV\",\"mode\":2,\"lat\":40.1,\"lon\":-83.1}\n",
            );
            socket.write_all(lines.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
        });

        let client = GpsdClient::connect("127.0.0.1", port).await.unwrap();
        assert_eq!(client.addr(), format!("127.0.0.1:{}", port));
        let mut reports = client.spawn_reports(&Handle::current());
        server.await.unwrap();

        let mut received = Vec::new();
        for _ in 0..100 {
            while let Some(tpv) = reports.try_next() {
                received.push(tpv);
            }
            if received.len() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(received.len(), 2);
        assert_eq!(received[0].track, Some(90.0));
        assert_eq!(received[1].mode, 2);
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = GpsdClient::connect("127.0.0.1", port).await.err().unwrap();
        assert!(matches!(err, GpsdError::Connect { .. }));
    }

    #[test]
    fn test_empty_stream_never_blocks() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut stream = ReportStream::from_receiver(rx);
        assert!(stream.try_next().is_none());

        tx.send(Tpv { mode: 1, ..Default::default() }).unwrap();
        tx.send(Tpv { mode: 3, ..Default::default() }).unwrap();
        assert_eq!(stream.drain_latest().map(|t| t.mode), Some(3));
        assert!(!stream.is_closed());

        drop(tx);
        assert!(stream.try_next().is_none());
        assert!(stream.is_closed());
    }
}
