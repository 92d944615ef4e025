//! Fixed tokens and defaults shared by both peers.

/// Byte terminating every control token.
pub const DELIMITER: u8 = 0;

/// Version token the receiver sends on connect; peers must match exactly.
pub const VERSION: &str = "xfer3.4";

/// Mode token telling the receiver to overwrite existing files for this session.
pub const FORCE_OVERWRITE: &str = "forceOverwrite";

/// Mode token leaving the receiver's own conflict policy in effect.
pub const NEUTRAL_MODE: &str = "x";

/// Path token ending the item loop.
pub const FINISHED: &str = "FINIS.";

/// Suffix appended to the destination name under the copy policy.
pub const COPY_SUFFIX: &str = ".xfer";

/// TCP port used when none is configured.
pub const DEFAULT_PORT: u16 = 9337;

/// Size token announcing a directory item.
pub const DIRECTORY_SIZE: i64 = -1;

/// Longest control token accepted from a peer.
pub const MAX_TOKEN_LEN: usize = 64 * 1024;
