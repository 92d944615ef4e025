//! Parsed command-line options and their mapping onto [`SessionConfig`].

use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use compress::CompressionLevel;
use logging::LogLevel;
use protocol::constants::DEFAULT_PORT;
use transfer::{ConflictPolicy, DEFAULT_MODIFY_WINDOW, SessionConfig};

use crate::command::{PROGRAM_NAME, clap_command, normalize_arguments};

/// Options accepted by `xfer`, after clap validation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedArgs {
    /// `--help` was given.
    pub show_help: bool,
    /// `-V/--version` was given.
    pub show_version: bool,
    /// Receiver target directory.
    pub target: PathBuf,
    /// Receiver host for the sender.
    pub host: String,
    /// TCP port of the receiver.
    pub port: u16,
    /// Explicit block size, if given.
    pub block_size: Option<NonZeroUsize>,
    /// Policy selected by the last of `-o`/`-O`.
    pub conflict_policy: ConflictPolicy,
    /// `-z` was given.
    pub compress: bool,
    /// Level selected with `-Z`, already bucketed.
    pub compress_level: Option<CompressionLevel>,
    /// Level selected with `-l`.
    pub log_level: LogLevel,
    /// Allowed peer address prefixes.
    pub allowed_prefixes: Vec<String>,
    /// Modification time tolerance.
    pub modify_window: Duration,
    /// Progress ticks per file, when progress output is on.
    pub progress_ticks: Option<u32>,
    /// Paths are cygwin paths to translate.
    pub cygwin: bool,
    /// Positional roots, verbatim.
    pub paths: Vec<OsString>,
}

impl ParsedArgs {
    /// Builds the shared session settings from the options.
    ///
    /// `-Z` alone only records the level; compression is enabled by `-z`.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        let compression = self
            .compress
            .then(|| self.compress_level.unwrap_or_default());
        let mut builder = SessionConfig::builder()
            .compression(compression)
            .conflict_policy(self.conflict_policy)
            .allowed_prefixes(self.allowed_prefixes.iter().cloned())
            .modify_window(self.modify_window)
            .progress_ticks(self.progress_ticks);
        if let Some(block_size) = self.block_size {
            builder = builder.block_size(block_size);
        }
        builder.build()
    }

    /// Returns `true` when no positional paths were given.
    #[must_use]
    pub fn is_receiver(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Parses `arguments` (program name first).
pub fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let args = normalize_arguments(arguments);
    let mut matches = clap_command(PROGRAM_NAME).try_get_matches_from(args)?;

    let conflict_policy = if matches.get_flag("overwrite") {
        ConflictPolicy::Overwrite
    } else if matches.get_flag("copy") {
        ConflictPolicy::Copy
    } else {
        ConflictPolicy::Keep
    };

    Ok(ParsedArgs {
        show_help: matches.get_flag("help"),
        show_version: matches.get_flag("version"),
        target: matches
            .remove_one::<OsString>("target")
            .map_or_else(|| PathBuf::from("."), PathBuf::from),
        host: matches
            .remove_one::<String>("host")
            .unwrap_or_else(|| String::from("localhost")),
        port: matches.remove_one::<u16>("port").unwrap_or(DEFAULT_PORT),
        block_size: matches.remove_one::<NonZeroUsize>("block-size"),
        conflict_policy,
        compress: matches.get_flag("compress"),
        compress_level: matches
            .remove_one::<i64>("compress-level")
            .map(CompressionLevel::from_bucket),
        log_level: matches
            .remove_one::<LogLevel>("log-level")
            .unwrap_or_default(),
        allowed_prefixes: matches
            .remove_many::<String>("allow")
            .map(|values| values.collect())
            .unwrap_or_default(),
        modify_window: matches
            .remove_one::<u64>("modify-window")
            .map_or(DEFAULT_MODIFY_WINDOW, Duration::from_millis),
        progress_ticks: matches.remove_one::<u32>("progress"),
        cygwin: matches.get_flag("cygwin"),
        paths: matches
            .remove_many::<OsString>("paths")
            .map(|values| values.collect())
            .unwrap_or_default(),
    })
}
