// Readiness probe over TCP
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::trace;

use embedded_redis_core::port::ReadinessProbe;

/// Ready means a TCP connect to 127.0.0.1:port succeeds within the timeout.
/// The connection is closed immediately; nothing is sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpReadinessProbe;

impl TcpReadinessProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReadinessProbe for TcpReadinessProbe {
    async fn probe(&self, port: u16, timeout: Duration) -> bool {
        match tokio::time::timeout(timeout, TcpStream::connect((Ipv4Addr::LOCALHOST, port))).await
        {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                trace!(port, error = %e, "Connect refused");
                false
            }
            Err(_) => {
                trace!(port, "Connect timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_listening_port_is_ready() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(TcpReadinessProbe::new().probe(port, Duration::from_millis(500)).await);
    }

    #[tokio::test]
    async fn test_closed_port_is_not_ready() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(!TcpReadinessProbe::new().probe(port, Duration::from_millis(500)).await);
    }
}
