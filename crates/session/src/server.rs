//! Receiver listener loop.

use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use logging::{target, trace_connect};
use socket2::{Domain, Protocol, SockAddr, SockRef, Socket, Type};
use tracing::{error, info, warn};
use transfer::{Channel, ReceiverContext, SessionConfig};

use crate::error::SessionError;

/// Name of the thread [`spawn_receiver`] runs the listener on.
pub const RECEIVER_THREAD_NAME: &str = "Rcv";

/// A bound receiver waiting to serve senders one at a time.
#[derive(Debug)]
pub struct ReceiverServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    target: PathBuf,
    config: Arc<SessionConfig>,
    closed: Arc<AtomicBool>,
}

/// Cloneable handle that stops a [`ReceiverServer`].
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    listener: Arc<TcpListener>,
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
}

impl ReceiverServer {
    /// Validates `target` and binds the listening socket.
    ///
    /// A `target` that exists as anything but a directory is rejected. A
    /// missing target is created on demand by the first session.
    pub fn bind(
        addr: SocketAddr,
        target: impl Into<PathBuf>,
        config: Arc<SessionConfig>,
    ) -> Result<Self, SessionError> {
        let target = target.into();
        validate_target(&target)?;

        let listener = listen(addr).map_err(|source| SessionError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| SessionError::Bind { addr, source })?;
        trace_connect!("listening on {} writing to {}", local_addr, target.display());

        Ok(Self {
            listener,
            local_addr,
            target,
            config,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Directory files are written to.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Returns a handle that stops [`Self::serve`] from another thread.
    pub fn shutdown_handle(&self) -> io::Result<ShutdownHandle> {
        Ok(ShutdownHandle {
            listener: Arc::new(self.listener.try_clone()?),
            local_addr: self.local_addr,
            closed: Arc::clone(&self.closed),
        })
    }

    /// Accepts and serves senders until shut down.
    ///
    /// Sessions run one at a time. A failing session is logged and the loop
    /// accepts again. Returns the number of sessions served once
    /// [`ShutdownHandle::shutdown`] has been called.
    pub fn serve(&self) -> Result<u64, SessionError> {
        let mut served = 0u64;
        loop {
            if self.is_closed() {
                return Ok(served);
            }
            trace_connect!("listening");
            let (stream, raw_peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(_) if self.is_closed() => {
                    trace_connect!("listener closed by shutdown");
                    return Ok(served);
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(SessionError::Accept {
                        addr: self.local_addr,
                        source,
                    });
                }
            };
            if self.is_closed() {
                return Ok(served);
            }

            let peer = normalize_peer_address(raw_peer);
            let peer_ip = peer.ip().to_string();
            if !self.config.allows_peer(&peer_ip) {
                warn!(target: target::CONNECT, "Connect from {peer_ip} not allowed!");
                let _ = stream.shutdown(Shutdown::Both);
                continue;
            }

            info!(target: target::CONNECT, "Connect from {peer_ip}");
            served += 1;
            self.handle(stream, peer);
        }
    }

    fn handle(&self, stream: TcpStream, peer: SocketAddr) {
        let reader = match stream.try_clone() {
            Ok(reader) => reader,
            Err(error) => {
                error!(target: target::CONNECT, "cannot use connection from {peer}: {error}");
                return;
            }
        };
        let mut channel = Channel::new(reader, stream, &self.config);
        let context = ReceiverContext::new(Arc::clone(&self.config), self.target.clone());
        match context.run(&mut channel) {
            Ok(summary) => trace_connect!(
                "session with {} done: {} files, {} bytes",
                peer,
                summary.files,
                summary.bytes
            ),
            Err(error) => error!(target: target::RECEIVER, "session with {peer} failed: {error}"),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl ShutdownHandle {
    /// Stops the listener.
    ///
    /// Marks the server closed, shuts the listening socket down and connects
    /// to it once so a blocked `accept` returns. A session in progress runs to
    /// completion first.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        trace_connect!("shutting down listener on {}", self.local_addr);
        let _ = SockRef::from(self.listener.as_ref()).shutdown(Shutdown::Both);
        let _ = TcpStream::connect(wake_address(self.local_addr));
    }

    /// Returns `true` once [`Self::shutdown`] has been called.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Runs [`ReceiverServer::serve`] on a thread named [`RECEIVER_THREAD_NAME`].
pub fn spawn_receiver(
    server: ReceiverServer,
) -> io::Result<(ShutdownHandle, thread::JoinHandle<Result<u64, SessionError>>)> {
    let handle = server.shutdown_handle()?;
    let thread = thread::Builder::new()
        .name(RECEIVER_THREAD_NAME.to_owned())
        .spawn(move || server.serve())?;
    Ok((handle, thread))
}

/// Normalizes an IPv4-mapped IPv6 peer address to plain IPv4.
///
/// A dual-stack listener reports IPv4 peers as `::ffff:a.b.c.d`; allow-list
/// prefixes are written against the dotted form.
#[must_use]
pub fn normalize_peer_address(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => SocketAddr::new(IpAddr::V4(v4), addr.port()),
            None => addr,
        },
        IpAddr::V4(_) => addr,
    }
}

fn validate_target(target: &Path) -> Result<(), SessionError> {
    match fs::metadata(target) {
        Ok(metadata) if !metadata.is_dir() => Err(SessionError::InvalidTarget {
            path: target.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

fn listen(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    if addr.is_ipv6() && addr.ip().is_unspecified() {
        socket.set_only_v6(false)?;
    }
    socket.bind(&SockAddr::from(addr))?;
    socket.listen(128)?;
    Ok(socket.into())
}

fn wake_address(local: SocketAddr) -> SocketAddr {
    let ip = match local.ip() {
        IpAddr::V4(v4) if v4.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(v6) if v6.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, local.port())
}
