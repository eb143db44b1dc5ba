use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

pub const SMTP_PORT: u16 = 25;

/// Opens the transport to a mail exchanger.
///
/// The deadline is applied by the caller; implementations only report
/// whether a connection could be established.
#[async_trait]
pub trait Dialer: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    async fn dial(&self, exchange: &str) -> io::Result<Self::Stream>;
}

/// Plain TCP on the given port (25 unless overridden).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpDialer {
    port: u16,
}

impl TcpDialer {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

impl Default for TcpDialer {
    fn default() -> Self {
        Self::new(SMTP_PORT)
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    type Stream = TcpStream;

    async fn dial(&self, exchange: &str) -> io::Result<TcpStream> {
        TcpStream::connect((exchange, self.port)).await
    }
}
