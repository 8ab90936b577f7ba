use std::num::NonZeroUsize;

use snapfix_static::{DEFAULT_WRITE_PARALLELISM, EnvVars, max_write_parallelism};

/// What happens to fixed files at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Write every fixed file.
    Write,
    /// Ask which files to write, when attached to a terminal.
    Prompt,
    /// Report the fixes and write nothing.
    #[default]
    ReportOnly,
}

impl UpdateMode {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("1" | "true" | "on" | "yes") => Self::Write,
            Some("prompt" | "interactive") => Self::Prompt,
            _ => Self::ReportOnly,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub update: UpdateMode,
    /// Run fixed files through `rustfmt` when it can be found.
    pub reformat: bool,
    pub write_parallelism: NonZeroUsize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            update: UpdateMode::default(),
            reformat: true,
            write_parallelism: NonZeroUsize::new(DEFAULT_WRITE_PARALLELISM)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let update = std::env::var(EnvVars::SNAPFIX_UPDATE).ok();
        let reformat = std::env::var(EnvVars::SNAPFIX_REFORMAT).ok();
        Self {
            update: UpdateMode::parse(update.as_deref()),
            reformat: parse_reformat(reformat.as_deref()),
            write_parallelism: max_write_parallelism(),
        }
    }

    #[must_use]
    pub const fn with_update(mut self, update: UpdateMode) -> Self {
        self.update = update;
        self
    }

    #[must_use]
    pub const fn with_reformat(mut self, reformat: bool) -> Self {
        self.reformat = reformat;
        self
    }
}

fn parse_reformat(value: Option<&str>) -> bool {
    !matches!(
        value.map(|value| value.trim().to_ascii_lowercase()).as_deref(),
        Some("0" | "false" | "off" | "no")
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("yes"), UpdateMode::Write)]
    #[case(Some("1"), UpdateMode::Write)]
    #[case(Some("TRUE"), UpdateMode::Write)]
    #[case(Some("on"), UpdateMode::Write)]
    #[case(Some("interactive"), UpdateMode::Prompt)]
    #[case(Some("prompt"), UpdateMode::Prompt)]
    #[case(Some("no"), UpdateMode::ReportOnly)]
    #[case(Some(""), UpdateMode::ReportOnly)]
    #[case(None, UpdateMode::ReportOnly)]
    fn test_update_mode(#[case] value: Option<&str>, #[case] expected: UpdateMode) {
        assert_eq!(UpdateMode::parse(value), expected);
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some("yes"), true)]
    #[case(Some("0"), false)]
    #[case(Some("off"), false)]
    #[case(Some("No"), false)]
    fn test_reformat(#[case] value: Option<&str>, #[case] expected: bool) {
        assert_eq!(parse_reformat(value), expected);
    }
}
