use std::num::NonZeroUsize;

pub struct EnvVars;

impl EnvVars {
    /// Selects what happens to the fixed source files at the end of a run.
    ///
    /// `1`, `true`, `on` or `yes` writes every fixed file, `prompt` or
    /// `interactive` asks which files to write when attached to a terminal,
    /// anything else only reports.
    pub const SNAPFIX_UPDATE: &'static str = "SNAPFIX_UPDATE";

    /// When set to `0`, `false`, `off` or `no`, fixed files are not passed
    /// through `rustfmt` before they are written.
    pub const SNAPFIX_REFORMAT: &'static str = "SNAPFIX_REFORMAT";

    /// Filter directives for the `tracing` subscriber, e.g. `snapfix_patch=debug`.
    pub const SNAPFIX_LOG: &'static str = "SNAPFIX_LOG";

    /// Upper bound on the number of files written concurrently.
    pub const SNAPFIX_MAX_PARALLELISM: &'static str = "SNAPFIX_MAX_PARALLELISM";

    /// This is a standard Cargo environment variable.
    pub const CARGO_MANIFEST_DIR: &'static str = "CARGO_MANIFEST_DIR";
}

/// Name of the assertion macro whose call sites are patched.
pub const ASSERTION_MACRO: &str = "expect";

/// Path prefix used when generated code refers back to the facade crate.
pub const FACADE_CRATE: &str = "snapfix";

/// Exit code used when writing fixed files back to disk failed.
pub const WRITE_FAILED_EXIT_CODE: i32 = 165;

/// Number of files written concurrently unless overridden.
pub const DEFAULT_WRITE_PARALLELISM: usize = 5;

pub fn max_write_parallelism() -> NonZeroUsize {
    std::env::var(EnvVars::SNAPFIX_MAX_PARALLELISM)
        .ok()
        .and_then(|s| s.parse().ok())
        .or_else(|| NonZeroUsize::new(DEFAULT_WRITE_PARALLELISM))
        .unwrap_or(NonZeroUsize::MIN)
}
