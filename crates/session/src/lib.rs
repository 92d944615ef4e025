#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Connection management for xfer.
//!
//! # Overview
//!
//! [`ReceiverServer`] binds one listening socket and serves senders one at a
//! time, each through a fresh receiver state machine. Peers are checked
//! against the configured allow-list before a single byte is written to them.
//! [`ShutdownHandle::shutdown`] stops the loop from any thread, including a
//! signal handler thread; [`spawn_receiver`] runs the loop on its own thread.
//!
//! [`send_roots`] is the sending counterpart: it opens one connection,
//! expands every root into items and drives them through the sender state
//! machine.
//!
//! # Errors
//!
//! A failing receiver session is logged and does not stop the listener. Bind
//! failures, accept failures outside shutdown and every sender failure are
//! returned as [`SessionError`].
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use session::{ReceiverServer, SendRequest, send_roots, spawn_receiver};
//! use transfer::SessionConfig;
//!
//! let config = Arc::new(SessionConfig::default());
//! let server = ReceiverServer::bind("127.0.0.1:9337".parse()?, "/srv/incoming", Arc::clone(&config))?;
//! let (shutdown, thread) = spawn_receiver(server)?;
//!
//! let request = SendRequest::new("localhost", 9337, vec!["/home/me/photos".into()]);
//! send_roots(&request, config)?;
//!
//! shutdown.shutdown();
//! thread.join().expect("listener thread")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod error;
mod server;

pub use client::{SendRequest, send_roots, send_roots_with_progress};
pub use error::SessionError;
pub use server::{
    RECEIVER_THREAD_NAME, ReceiverServer, ShutdownHandle, normalize_peer_address, spawn_receiver,
};
