//! SIGINT/SIGTERM handling for the receiver.

use std::io;

use session::ShutdownHandle;

/// Stops the receiver behind `handle` on the first SIGINT or SIGTERM.
#[cfg(unix)]
pub(crate) fn shutdown_on_signal(handle: ShutdownHandle) -> io::Result<()> {
    use logging::target;
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::thread;
    use tracing::info;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    thread::Builder::new()
        .name("signals".to_owned())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                info!(target: target::CONNECT, "received signal {signal}, shutting down");
                handle.shutdown();
            }
        })?;
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn shutdown_on_signal(_handle: ShutdownHandle) -> io::Result<()> {
    Ok(())
}
