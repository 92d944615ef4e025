//! Receiving side of a session.
//!
//! The receiver speaks first with its version token, then answers each item
//! the sender announces. Bodies are read in block-size chunks from the shared
//! token stream; the bytes of a chunk that lie past the announced size are
//! pushed back so the digest token that follows is parsed intact.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use checksums::Md5;
use logging::{target, trace_recv, trace_stats};
use protocol::{
    BodyBoundary, COPY_SUFFIX, ExistenceDisposition, FINISHED, FORCE_OVERWRITE, Token,
    TransferItem, VERSION, parse_checked,
};
use tracing::{info, warn};

use crate::config::{ConflictPolicy, SessionConfig};
use crate::error::{TransferError, TransferResult};
use crate::mtime;
use crate::stats::{ReceiveSummary, format_rate};
use crate::wire::Channel;

/// State of one receiving session.
#[derive(Debug)]
pub struct ReceiverContext {
    config: Arc<SessionConfig>,
    target: PathBuf,
    policy: ConflictPolicy,
    summary: ReceiveSummary,
    started: Instant,
}

/// Where an accepted file body is written.
struct Destination {
    path: PathBuf,
    file: File,
    disposition: ExistenceDisposition,
}

impl ReceiverContext {
    /// Creates a receiver writing below `target`.
    pub fn new(config: Arc<SessionConfig>, target: impl Into<PathBuf>) -> Self {
        let policy = config.conflict_policy();
        Self {
            config,
            target: target.into(),
            policy,
            summary: ReceiveSummary::default(),
            started: Instant::now(),
        }
    }

    /// Conflict policy in effect for this session.
    #[must_use]
    pub const fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Runs a complete session and returns its summary.
    pub fn run<R: Read, W: Write>(mut self, channel: &mut Channel<R, W>) -> TransferResult<ReceiveSummary> {
        self.handshake(channel)?;

        loop {
            let path = channel.receive()?;
            if path.is_empty() || path.is(FINISHED) {
                trace_recv!("sender finished");
                break;
            }
            let mod_time = self.read_number(channel, "modification time")?;
            let size = self.read_number(channel, "size")?;
            if size < -1 {
                warn!(
                    target: target::RECEIVER,
                    "negative size {size} for {path}, treating as empty file"
                );
            }
            let item = TransferItem::from_wire(path.into_bytes(), mod_time, size);
            info!(target: target::RECEIVER, "Receiving: {}", item.display_path());
            self.summary.items += 1;
            self.receive_item(channel, &item)?;
        }

        self.summary.elapsed = self.started.elapsed();
        if self.summary.bytes == 0 {
            warn!(target: target::RECEIVER, "Nothing transferred.");
        } else {
            trace_stats!(
                "Received {} bytes in {} ms = {}",
                self.summary.bytes,
                self.summary.elapsed.as_millis(),
                format_rate(self.summary.bytes, self.summary.elapsed)
            );
        }
        Ok(self.summary)
    }

    fn handshake<R: Read, W: Write>(&mut self, channel: &mut Channel<R, W>) -> TransferResult<()> {
        channel.send_flush(VERSION)?;
        let mode = channel.receive()?;
        if mode.is(FORCE_OVERWRITE) {
            info!(target: target::RECEIVER, "Sender forces overwrite");
            self.policy = ConflictPolicy::Overwrite;
        }
        Ok(())
    }

    fn read_number<R: Read, W: Write>(
        &self,
        channel: &mut Channel<R, W>,
        field: &'static str,
    ) -> TransferResult<i64> {
        let token = channel.receive()?;
        if token.is_empty() && token.hit_end_of_stream() {
            return Err(TransferError::ConnectionClosed { expected: field });
        }
        Ok(parse_checked(token.as_bytes()).unwrap_or_else(|| {
            warn!(target: target::RECEIVER, "malformed {field} {token:?}, using 0");
            0
        }))
    }

    fn receive_item<R: Read, W: Write>(
        &mut self,
        channel: &mut Channel<R, W>,
        item: &TransferItem,
    ) -> TransferResult<()> {
        if item.escapes_target() {
            warn!(
                target: target::RECEIVER,
                "refusing {} outside the target directory",
                item.display_path()
            );
            self.summary.skipped += 1;
            return Self::answer(channel, ExistenceDisposition::WontOverwrite);
        }
        let Some(relative) = item.local_path() else {
            warn!(
                target: target::RECEIVER,
                "refusing {}: not a valid file name here",
                item.display_path()
            );
            self.summary.skipped += 1;
            return Self::answer(channel, ExistenceDisposition::WontOverwrite);
        };

        let path = self.target.join(relative);
        if item.is_directory() {
            let disposition = self.prepare_directory(&path)?;
            self.summary.directories += 1;
            return Self::answer(channel, disposition);
        }

        let Some(destination) = self.prepare_file(&path)? else {
            self.summary.skipped += 1;
            return Self::answer(channel, ExistenceDisposition::WontOverwrite);
        };
        Self::answer(channel, destination.disposition)?;
        self.receive_body(channel, item, destination)
    }

    fn answer<R: Read, W: Write>(
        channel: &mut Channel<R, W>,
        disposition: ExistenceDisposition,
    ) -> TransferResult<()> {
        trace_recv!("answering {}", disposition);
        channel.send_flush(disposition.as_token())?;
        Ok(())
    }

    fn prepare_directory(&self, path: &Path) -> TransferResult<ExistenceDisposition> {
        match fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => {
                trace_recv!("{} already exists", path.display());
                Ok(ExistenceDisposition::NotExists)
            }
            Ok(_) => Err(TransferError::DirectoryCollision {
                path: path.to_path_buf(),
            }),
            Err(_) => match fs::create_dir_all(path) {
                Ok(()) => {
                    trace_recv!("created {}", path.display());
                    Ok(ExistenceDisposition::NotExists)
                }
                Err(error) => {
                    warn!(
                        target: target::RECEIVER,
                        "cannot create directory {}: {error}",
                        path.display()
                    );
                    Ok(ExistenceDisposition::WontOverwrite)
                }
            },
        }
    }

    /// Resolves the conflict policy and opens the output file.
    ///
    /// Returns `None` when the body must be refused.
    fn prepare_file(&self, path: &Path) -> TransferResult<Option<Destination>> {
        let (output, disposition) = match fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => {
                return Err(TransferError::FileCollision {
                    path: path.to_path_buf(),
                });
            }
            Ok(_) => match self.policy {
                ConflictPolicy::Overwrite => {
                    info!(target: target::RECEIVER, "{} exists, will be overwritten", path.display());
                    (path.to_path_buf(), ExistenceDisposition::WillOverwrite)
                }
                ConflictPolicy::Copy => {
                    info!(target: target::RECEIVER, "{} exists, will create copy", path.display());
                    (copy_path(path), ExistenceDisposition::NotExists)
                }
                ConflictPolicy::Keep => {
                    info!(target: target::RECEIVER, "{} exists, will NOT be overwritten", path.display());
                    return Ok(None);
                }
            },
            Err(_) => {
                if let Some(parent) = path.parent() {
                    if let Err(error) = fs::create_dir_all(parent) {
                        warn!(
                            target: target::RECEIVER,
                            "cannot create directories for {}: {error}",
                            path.display()
                        );
                        return Ok(None);
                    }
                }
                (path.to_path_buf(), ExistenceDisposition::NotExists)
            }
        };

        match File::create(&output) {
            Ok(file) => Ok(Some(Destination {
                path: output,
                file,
                disposition,
            })),
            Err(error) => {
                warn!(
                    target: target::RECEIVER,
                    "output file {} could not be created: {error}",
                    output.display()
                );
                Ok(None)
            }
        }
    }

    fn receive_body<R: Read, W: Write>(
        &mut self,
        channel: &mut Channel<R, W>,
        item: &TransferItem,
        destination: Destination,
    ) -> TransferResult<()> {
        let Destination { path, file, .. } = destination;
        trace_recv!("writing {} bytes to {}", item.size(), path.display());

        let mut output = BufWriter::new(file);
        let mut hasher = Md5::new();
        let mut boundary = BodyBoundary::new(item.size());
        let mut chunk = vec![0u8; self.config.block_size().get()];

        while !boundary.is_complete() {
            let read = match channel.reader().read(&mut chunk) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "connection closed after {} of {} bytes of {}",
                            boundary.consumed(),
                            item.size(),
                            item.display_path()
                        ),
                    )
                    .into());
                }
                Ok(read) => read,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error.into()),
            };
            let split = boundary.advance(read);
            let body = &chunk[..split.body];
            hasher.update(body);
            output.write_all(body)?;
            channel.reader().unread(&chunk[split.body..read]);
        }
        output.flush()?;
        drop(output);

        let remote = channel.receive()?;
        let local = hasher.finish();
        channel.send_flush(local.as_str())?;
        if remote.is_empty() && remote.hit_end_of_stream() {
            return Err(TransferError::ConnectionClosed { expected: "digest" });
        }
        self.check_digest(&remote, local.as_str(), item);

        self.apply_mod_time(&path, item.mod_time());
        self.summary.files += 1;
        self.summary.bytes += item.size();
        Ok(())
    }

    fn check_digest(&mut self, remote: &Token, local: &str, item: &TransferItem) {
        if remote.is(local) {
            trace_recv!("digest {} agrees for {}", local, item.display_path());
        } else {
            warn!(
                target: target::RECEIVER,
                "digest mismatch for {}: sender {} vs local {}",
                item.display_path(),
                remote,
                local
            );
            self.summary.digest_mismatches += 1;
        }
    }

    fn apply_mod_time(&self, path: &Path, mod_time: i64) {
        if let Err(error) = mtime::apply_millis(path, mod_time) {
            warn!(
                target: target::RECEIVER,
                "modification time of {} could not be set: {error}",
                path.display()
            );
            return;
        }
        match mtime::read_millis(path) {
            Ok(actual) => {
                let drift = mtime::drift(mod_time, actual);
                if drift > self.config.modify_window() {
                    warn!(
                        target: target::RECEIVER,
                        "modification times of {} don't agree, diff={}ms",
                        path.display(),
                        drift.as_millis()
                    );
                }
            }
            Err(error) => warn!(
                target: target::RECEIVER,
                "cannot read back modification time of {}: {error}",
                path.display()
            ),
        }
    }
}

/// Destination used by the copy policy: the file name with the copy suffix.
#[must_use]
pub fn copy_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(COPY_SUFFIX);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_path_appends_suffix_to_file_name() {
        assert_eq!(
            copy_path(Path::new("/target/root/report.pdf")),
            PathBuf::from("/target/root/report.pdf.xfer")
        );
    }

    #[test]
    fn receiver_starts_with_configured_policy() {
        let config = Arc::new(
            SessionConfig::builder()
                .conflict_policy(ConflictPolicy::Copy)
                .build(),
        );
        let context = ReceiverContext::new(config, "/tmp");
        assert_eq!(context.policy(), ConflictPolicy::Copy);
    }

    #[test]
    fn forced_overwrite_is_session_local() {
        let config = Arc::new(SessionConfig::default());
        let mut channel = Channel::new(
            io::Cursor::new(b"forceOverwrite\0".to_vec()),
            Vec::new(),
            &config,
        );
        let mut context = ReceiverContext::new(Arc::clone(&config), "/tmp");
        context.handshake(&mut channel).expect("handshake");
        assert_eq!(context.policy(), ConflictPolicy::Overwrite);
        assert_eq!(config.conflict_policy(), ConflictPolicy::Keep);
    }
}
