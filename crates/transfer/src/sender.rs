//! Sending side of a session.
//!
//! The sender drives the conversation: after checking the receiver's version
//! and announcing its overwrite mode it announces every item, waits for the
//! receiver's answer, streams accepted bodies and exchanges digests. Nothing
//! is pipelined; every reply is read before the next request is written.

use std::fs::File;
use std::io::{self, BufReader, Read, Stdout, Write};
use std::sync::Arc;
use std::time::Instant;

use checksums::{FileDigest, Md5};
use logging::{target, trace_send, trace_stats};
use protocol::{ExistenceDisposition, FINISHED, FORCE_OVERWRITE, NEUTRAL_MODE, VERSION};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{TransferError, TransferResult};
use crate::items::SourceItem;
use crate::progress::ProgressBar;
use crate::stats::{SendSummary, format_bytes, format_rate};
use crate::wire::Channel;

/// State of one sending session.
#[derive(Debug)]
pub struct SenderContext<P: Write = Stdout> {
    config: Arc<SessionConfig>,
    progress_out: P,
    summary: SendSummary,
    started: Instant,
}

impl SenderContext<Stdout> {
    /// Creates a sender printing progress bars to standard output.
    pub fn new(config: Arc<SessionConfig>) -> Self {
        Self::with_progress_output(config, io::stdout())
    }
}

impl<P: Write> SenderContext<P> {
    /// Creates a sender printing progress bars to `progress_out`.
    pub fn with_progress_output(config: Arc<SessionConfig>, progress_out: P) -> Self {
        Self {
            config,
            progress_out,
            summary: SendSummary::default(),
            started: Instant::now(),
        }
    }

    /// Verifies the receiver's version and announces the overwrite mode.
    pub fn handshake<R: Read, W: Write>(&mut self, channel: &mut Channel<R, W>) -> TransferResult<()> {
        let version = channel.receive()?;
        if version.is_empty() && version.hit_end_of_stream() {
            return Err(TransferError::ConnectionClosed { expected: "version" });
        }
        if !version.is(VERSION) {
            return Err(TransferError::VersionMismatch {
                local: VERSION.to_owned(),
                remote: version.text().into_owned(),
            });
        }
        trace_send!("receiver speaks {}", version);

        let mode = if self.config.conflict_policy().overwrites() {
            FORCE_OVERWRITE
        } else {
            NEUTRAL_MODE
        };
        channel.send_flush(mode)?;
        Ok(())
    }

    /// Announces one item and, when the receiver accepts it, streams its body
    /// and exchanges digests.
    pub fn send_item<R: Read, W: Write>(
        &mut self,
        channel: &mut Channel<R, W>,
        source: &SourceItem,
    ) -> TransferResult<()> {
        let item = source.item();

        let file = if item.is_directory() {
            None
        } else {
            match File::open(source.source()) {
                Ok(file) => Some(file),
                Err(error) => {
                    warn!(
                        target: target::SENDER,
                        "cannot open {}: {error}; skipping",
                        source.source().display()
                    );
                    self.summary.skipped += 1;
                    return Ok(());
                }
            }
        };

        info!(target: target::SENDER, "Sending {}", source.source().display());
        channel.send(item.relative_path())?;
        channel.send(&item.mod_time().to_string())?;
        channel.send_flush(&item.wire_size().to_string())?;
        self.summary.items += 1;

        let answer = channel.receive()?;
        if answer.is_empty() && answer.hit_end_of_stream() {
            return Err(TransferError::ConnectionClosed {
                expected: "existence answer",
            });
        }
        let disposition = ExistenceDisposition::from_token(answer.as_bytes()).ok_or_else(|| {
            TransferError::UnexpectedToken {
                context: "existence answer",
                token: answer.text().into_owned(),
            }
        })?;
        trace_send!("receiver answers {} for {}", disposition, item.display_path());

        if !disposition.accepts_body() {
            warn!(
                target: target::SENDER,
                "{} exists on the receiver, not sending",
                item.display_path()
            );
            self.summary.skipped += 1;
            return Ok(());
        }

        let Some(file) = file else {
            self.summary.directories += 1;
            return Ok(());
        };

        let started = Instant::now();
        let digest = self.stream_body(channel, file, source)?;
        let elapsed = started.elapsed();
        let rate = format_rate(item.size(), elapsed);
        if self.config.progress_ticks().is_some() {
            trace_stats!(
                "Sent {} bytes in {} ms = {rate}",
                item.size(),
                elapsed.as_millis()
            );
        } else {
            debug!(
                target: target::STATS,
                "Sent {} bytes in {} ms = {rate}",
                item.size(),
                elapsed.as_millis()
            );
        }

        channel.send_flush(digest.as_str())?;
        let reply = channel.receive()?;
        if reply.is_empty() {
            return Err(TransferError::ConnectionClosed {
                expected: "digest reply",
            });
        }
        if reply.as_bytes() == digest.as_str().as_bytes() {
            trace_send!("receiver confirms digest {}", digest);
        } else {
            warn!(
                target: target::SENDER,
                "receiver reports digest {} for {}, local digest is {}",
                reply,
                item.display_path(),
                digest
            );
            self.summary.digest_mismatches += 1;
        }

        self.summary.files += 1;
        self.summary.bytes += item.size();
        Ok(())
    }

    /// Sends the termination token and returns the session summary.
    pub fn finish<R: Read, W: Write>(mut self, channel: &mut Channel<R, W>) -> TransferResult<SendSummary> {
        channel.send_flush(FINISHED)?;
        self.summary.elapsed = self.started.elapsed();
        trace_send!("sent {} items", self.summary.items);
        Ok(self.summary)
    }

    /// Runs a complete session over `items`.
    pub fn run<R, W, I>(mut self, channel: &mut Channel<R, W>, items: I) -> TransferResult<SendSummary>
    where
        R: Read,
        W: Write,
        I: IntoIterator<Item = SourceItem>,
    {
        self.handshake(channel)?;
        for item in items {
            self.send_item(channel, &item)?;
        }
        self.finish(channel)
    }

    fn stream_body<R: Read, W: Write>(
        &mut self,
        channel: &mut Channel<R, W>,
        file: File,
        source: &SourceItem,
    ) -> TransferResult<FileDigest> {
        let size = source.item().size();
        let mut reader = BufReader::new(file).take(size);
        let mut buffer = vec![0u8; self.config.block_size().get()];
        let mut hasher = Md5::new();
        let mut sent = 0u64;

        let mut progress = match self.config.progress_ticks() {
            Some(ticks) => {
                let bar = ProgressBar::start(&mut self.progress_out, ticks, size)?;
                trace_stats!(
                    "Each tick is {}",
                    format_bytes(bar.bytes_per_tick() as f64)
                );
                Some(bar)
            }
            None => None,
        };

        while sent < size {
            let read = match reader.read(&mut buffer) {
                Ok(0) => {
                    return Err(TransferError::SourceTruncated {
                        path: source.source().to_path_buf(),
                        expected: size,
                        sent,
                    });
                }
                Ok(read) => read,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error.into()),
            };
            hasher.update(&buffer[..read]);
            channel.writer().write_all(&buffer[..read])?;
            sent += read as u64;
            if let Some(bar) = progress.as_mut() {
                bar.update(sent)?;
            }
        }

        if let Some(bar) = progress {
            bar.finish()?;
        }
        Ok(hasher.finish())
    }
}
