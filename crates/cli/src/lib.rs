#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the thin front-end of the `xfer` binary. It parses the command
//! line with `clap`, installs logging, and then either runs a receiver until
//! it is interrupted or sends the given paths to a receiver.
//!
//! # Design
//!
//! - [`parse_args`] turns the argument vector into [`ParsedArgs`]; clap
//!   enforces value types and the `-o`/`-O` override.
//! - [`ParsedArgs::session_config`] builds the immutable
//!   [`transfer::SessionConfig`] shared by every session.
//! - [`run`] dispatches on the presence of positional paths and maps the
//!   outcome onto an exit status.
//!
//! # Errors
//!
//! Usage errors print clap's diagnostic and exit with `1`. Failures after
//! parsing are reported through [`CliError`], whose
//! [`CliError::exit_code`] distinguishes connection failures (`2`) from
//! everything else (`1`).
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let status = cli::run(["xfer", "--version"], &mut stdout, &mut stderr);
//! assert_eq!(status, 0);
//! assert!(String::from_utf8_lossy(&stdout).starts_with("xfer "));
//! ```

mod command;
mod cygwin;
mod error;
mod options;
mod roots;
mod signals;

use std::ffi::OsString;
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use logging::{target, trace_stats};
use session::{ReceiverServer, SendRequest, SessionError, send_roots_with_progress, spawn_receiver};
use tracing::{debug, info, warn};
use transfer::SessionConfig;

pub use cygwin::cygwin_to_windows;
pub use error::CliError;
pub use options::{ParsedArgs, parse_args};

/// Runs `xfer` with `arguments` (program name first) and returns the exit
/// status.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let parsed = match parse_args(arguments) {
        Ok(parsed) => parsed,
        Err(error) => {
            let _ = write!(stderr, "{error}");
            return 1;
        }
    };

    match execute(&parsed, stdout, stderr) {
        Ok(()) => 0,
        Err(error) => {
            let _ = writeln!(stderr, "{}: {error}", command::PROGRAM_NAME);
            error.exit_code()
        }
    }
}

fn execute<Out: Write, Err: Write>(
    parsed: &ParsedArgs,
    stdout: &mut Out,
    stderr: &mut Err,
) -> Result<(), CliError> {
    if parsed.show_help {
        return stdout
            .write_all(command::help_text().as_bytes())
            .map_err(CliError::Output);
    }
    if parsed.show_version {
        return stdout
            .write_all(command::version_text().as_bytes())
            .map_err(CliError::Output);
    }

    if let Err(error) = logging::init(parsed.log_level) {
        let _ = writeln!(stderr, "{}: {error}", command::PROGRAM_NAME);
    }

    let config = Arc::new(parsed.session_config());
    debug!(target: target::CONNECT, "configuration: {config:?}");

    if parsed.is_receiver() {
        receive(parsed, config)
    } else {
        send(parsed, config, stdout)
    }
}

fn send<Out: Write>(
    parsed: &ParsedArgs,
    config: Arc<SessionConfig>,
    stdout: &mut Out,
) -> Result<(), CliError> {
    let roots = roots::resolve_roots(&parsed.paths, parsed.cygwin);
    if roots.is_empty() {
        return Err(CliError::NoUsableRoots);
    }

    let request = SendRequest::new(parsed.host.clone(), parsed.port, roots);
    let summary = send_roots_with_progress(&request, config, &mut *stdout)?;
    trace_stats!(
        "sent {} files and {} directories, skipped {}",
        summary.files,
        summary.directories,
        summary.skipped
    );
    Ok(())
}

fn receive(parsed: &ParsedArgs, config: Arc<SessionConfig>) -> Result<(), CliError> {
    let server = bind_receiver(parsed.port, &parsed.target, config)?;
    let (handle, listener) = spawn_receiver(server).map_err(SessionError::from)?;
    if let Err(error) = signals::shutdown_on_signal(handle) {
        warn!(target: target::CONNECT, "signal handling unavailable: {error}");
    }

    let served = listener.join().map_err(|_| CliError::ReceiverPanicked)??;
    info!(target: target::CONNECT, "receiver stopped after {served} sessions");
    Ok(())
}

/// Binds a dual-stack listener, falling back to IPv4 only.
fn bind_receiver(
    port: u16,
    target_dir: &Path,
    config: Arc<SessionConfig>,
) -> Result<ReceiverServer, SessionError> {
    let dual_stack = SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port);
    match ReceiverServer::bind(dual_stack, target_dir, Arc::clone(&config)) {
        Err(SessionError::Bind { source, .. }) => {
            debug!(
                target: target::CONNECT,
                "IPv6 listener unavailable ({source}), binding IPv4 only"
            );
            let ipv4 = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
            ReceiverServer::bind(ipv4, target_dir, config)
        }
        other => other,
    }
}
