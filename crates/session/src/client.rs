//! Sender side: connect, expand roots and drive every item.

use std::io::{self, Write};
use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::Arc;

use logging::{target, trace_connect, trace_flist};
use tracing::warn;
use transfer::{Channel, Expansion, RootItems, SendSummary, SenderContext, SessionConfig};

use crate::error::SessionError;

/// Where and what a sender transfers.
#[derive(Clone, Debug)]
pub struct SendRequest {
    host: String,
    port: u16,
    roots: Vec<PathBuf>,
}

impl SendRequest {
    /// Sends `roots` to the receiver at `host:port`.
    pub fn new(host: impl Into<String>, port: u16, roots: Vec<PathBuf>) -> Self {
        Self {
            host: host.into(),
            port,
            roots,
        }
    }

    /// Receiver host name or address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Receiver port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Roots in the order they are sent.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Connects to the receiver and sends every root, printing progress bars to
/// standard output.
pub fn send_roots(
    request: &SendRequest,
    config: Arc<SessionConfig>,
) -> Result<SendSummary, SessionError> {
    send_roots_with_progress(request, config, io::stdout())
}

/// Like [`send_roots`], writing progress bars to `progress_out`.
pub fn send_roots_with_progress<P: Write>(
    request: &SendRequest,
    config: Arc<SessionConfig>,
    progress_out: P,
) -> Result<SendSummary, SessionError> {
    let stream = TcpStream::connect((request.host.as_str(), request.port)).map_err(|source| {
        SessionError::Connect {
            host: request.host.clone(),
            port: request.port,
            source,
        }
    })?;
    if let Ok(peer) = stream.peer_addr() {
        trace_connect!("connected to {}", peer);
    }
    let reader = stream.try_clone()?;
    let mut channel = Channel::new(reader, stream, &config);

    let mut sender = SenderContext::with_progress_output(Arc::clone(&config), progress_out);
    sender.handshake(&mut channel)?;

    for root in &request.roots {
        trace_flist!("root {}", root.display());
        let items = match RootItems::new(root) {
            Ok(items) => items,
            Err(error) => {
                warn!(target: target::FLIST, "{error}; skipping root");
                continue;
            }
        };
        for step in items {
            match step {
                Ok(Expansion::Item(item)) => sender.send_item(&mut channel, &item)?,
                Ok(Expansion::Unsupported(path)) => {
                    warn!(
                        target: target::FLIST,
                        "{} is neither a file nor a directory; skipping",
                        path.display()
                    );
                }
                Ok(Expansion::Unencodable(path)) => {
                    warn!(
                        target: target::FLIST,
                        "{} has a name that cannot be sent; skipping",
                        path.display()
                    );
                }
                Err(error) => warn!(target: target::FLIST, "{error}; skipping"),
            }
        }
    }

    let summary = sender.finish(&mut channel)?;
    trace_connect!("disconnecting");
    Ok(summary)
}
