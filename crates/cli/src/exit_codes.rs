//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part of
//! the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 1    | General error (unspecified)                         |
//! | 2    | Usage error (bad args, bad config, bad override)    |
//! | 3    | Fewer than 2 usable snapshots after skips           |
//! | 4    | Every input file failed to read or join             |
//! | 5    | Partial result: some files were skipped             |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, malformed config or sheet override.
pub const EXIT_USAGE: u8 = 2;

/// Fewer than 2 snapshots survived parsing/joining; nothing to compare.
pub const EXIT_INSUFFICIENT_SNAPSHOTS: u8 = 3;

/// All input files failed; no snapshot could be built at all.
pub const EXIT_ALL_FILES_FAILED: u8 = 4;

/// The comparison ran, but at least one file was skipped.
/// Results cover the surviving files only.
pub const EXIT_PARTIAL: u8 = 5;
