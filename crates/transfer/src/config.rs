//! Immutable per-process transfer settings.

use std::num::NonZeroUsize;
use std::time::Duration;

use compress::{CompressionLevel, DEFAULT_BLOCK_SIZE};

/// What the receiver does when a file it is sent already exists.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ConflictPolicy {
    /// Keep the existing file and skip the body.
    #[default]
    Keep,
    /// Replace the existing file.
    Overwrite,
    /// Write the body next to the existing file under a suffixed name.
    Copy,
}

impl ConflictPolicy {
    /// Returns `true` for [`ConflictPolicy::Overwrite`].
    #[must_use]
    pub const fn overwrites(self) -> bool {
        matches!(self, Self::Overwrite)
    }
}

/// Default tolerance when comparing a written modification time.
pub const DEFAULT_MODIFY_WINDOW: Duration = Duration::from_millis(1000);

/// Tick count used when progress reporting is enabled without a count.
pub const DEFAULT_PROGRESS_TICKS: u32 = 40;

/// Settings shared read-only by every session of a process.
///
/// Built once through [`SessionConfig::builder`] and handed to sessions behind
/// an `Arc`. A session that needs a different conflict policy (the sender
/// forcing overwrite) derives it locally and never mutates the config.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionConfig {
    block_size: NonZeroUsize,
    compression: Option<CompressionLevel>,
    conflict_policy: ConflictPolicy,
    allowed_prefixes: Vec<String>,
    modify_window: Duration,
    progress_ticks: Option<u32>,
}

impl SessionConfig {
    /// Starts a builder populated with the defaults.
    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Read and write chunk size; also the frame capacity when compressing.
    #[must_use]
    pub const fn block_size(&self) -> NonZeroUsize {
        self.block_size
    }

    /// Compression level, or `None` for a plain stream.
    #[must_use]
    pub const fn compression(&self) -> Option<CompressionLevel> {
        self.compression
    }

    /// Policy for files that already exist on the receiver.
    #[must_use]
    pub const fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy
    }

    /// Address prefixes a receiver accepts connections from; empty allows all.
    #[must_use]
    pub fn allowed_prefixes(&self) -> &[String] {
        &self.allowed_prefixes
    }

    /// Largest accepted difference between announced and applied mtimes.
    #[must_use]
    pub const fn modify_window(&self) -> Duration {
        self.modify_window
    }

    /// Number of progress ticks per file, or `None` when disabled.
    #[must_use]
    pub const fn progress_ticks(&self) -> Option<u32> {
        self.progress_ticks
    }

    /// Checks a textual peer address against the allow-list.
    ///
    /// Each prefix is trimmed before comparison, so a blank prefix matches
    /// every peer.
    #[must_use]
    pub fn allows_peer(&self, peer: &str) -> bool {
        self.allowed_prefixes.is_empty()
            || self
                .allowed_prefixes
                .iter()
                .any(|prefix| peer.starts_with(prefix.trim()))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfigBuilder::default().build()
    }
}

/// Builder for [`SessionConfig`].
#[derive(Clone, Debug)]
pub struct SessionConfigBuilder {
    block_size: NonZeroUsize,
    compression: Option<CompressionLevel>,
    conflict_policy: ConflictPolicy,
    allowed_prefixes: Vec<String>,
    modify_window: Duration,
    progress_ticks: Option<u32>,
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self {
            block_size: NonZeroUsize::new(DEFAULT_BLOCK_SIZE).unwrap_or(NonZeroUsize::MIN),
            compression: None,
            conflict_policy: ConflictPolicy::Keep,
            allowed_prefixes: Vec::new(),
            modify_window: DEFAULT_MODIFY_WINDOW,
            progress_ticks: None,
        }
    }
}

impl SessionConfigBuilder {
    /// Sets the chunk and frame size.
    #[must_use]
    pub const fn block_size(mut self, block_size: NonZeroUsize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Enables compression at `level`, or disables it with `None`.
    #[must_use]
    pub const fn compression(mut self, level: Option<CompressionLevel>) -> Self {
        self.compression = level;
        self
    }

    /// Sets the conflict policy.
    #[must_use]
    pub const fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Replaces the allow-list.
    #[must_use]
    pub fn allowed_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the modification-time tolerance.
    #[must_use]
    pub const fn modify_window(mut self, window: Duration) -> Self {
        self.modify_window = window;
        self
    }

    /// Enables progress output with `ticks` ticks per file, or disables it.
    #[must_use]
    pub const fn progress_ticks(mut self, ticks: Option<u32>) -> Self {
        self.progress_ticks = ticks;
        self
    }

    /// Finalises the configuration.
    #[must_use]
    pub fn build(self) -> SessionConfig {
        SessionConfig {
            block_size: self.block_size,
            compression: self.compression,
            conflict_policy: self.conflict_policy,
            allowed_prefixes: self.allowed_prefixes,
            modify_window: self.modify_window,
            progress_ticks: self.progress_ticks,
        }
    }
}
