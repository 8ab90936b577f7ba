use std::fmt;
use std::panic::Location;
use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use snapfix_static::EnvVars;

/// `at name (file:line:column)`
static NAMED_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^:)]*):(\d+):(\d+)\)$").unwrap());

/// `at file:line:column`
static ANONYMOUS_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"at ([^:)]*):(\d+):(\d+)$").unwrap());

static VENDORED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\\/])(?:node_modules|vendor|\.cargo[\\/](?:registry|git))[\\/]|^/rustc/")
        .unwrap()
});

/// Where an assertion was invoked. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallSite {
    pub file: Utf8PathBuf,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

impl CallSite {
    /// Build a call site from the location recorded by `#[track_caller]`.
    ///
    /// Returns `None` for locations inside dependencies or the standard library.
    pub fn from_location(location: &Location<'_>) -> Option<Self> {
        if is_vendored(location.file()) {
            return None;
        }
        Some(Self {
            file: resolve_path(location.file()),
            line: location.line() as usize,
            column: location.column() as usize,
        })
    }
}

/// Find the user's call site in a captured stack trace.
///
/// Only lines holding a location (`at ...`) count as frames. The first
/// `skip_frames` of them belong to the assertion machinery and are ignored,
/// then the first frame outside a vendored directory wins.
pub fn locate(trace: &str, skip_frames: usize) -> Option<CallSite> {
    let frame = trace
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("at "))
        .skip(skip_frames)
        .find(|frame| !is_vendored(frame_path(frame).unwrap_or(frame)))?;

    let captures = NAMED_FRAME
        .captures(frame)
        .or_else(|| ANONYMOUS_FRAME.captures(frame))?;

    Some(CallSite {
        file: resolve_path(&captures[1]),
        line: captures[2].parse().ok()?,
        column: captures[3].parse().ok()?,
    })
}

fn frame_path(frame: &str) -> Option<&str> {
    NAMED_FRAME
        .captures(frame)
        .or_else(|| ANONYMOUS_FRAME.captures(frame))
        .and_then(|captures| captures.get(1))
        .map(|path| path.as_str())
}

pub fn is_vendored(path: &str) -> bool {
    VENDORED.is_match(path)
}

/// Make a reported path absolute.
///
/// Cargo reports paths relative to the workspace root while tests run from the
/// package root, so every ancestor of the manifest directory is tried after the
/// current directory.
pub fn resolve_path(file: &str) -> Utf8PathBuf {
    let path = Utf8Path::new(file);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let cwd = std::env::current_dir()
        .ok()
        .and_then(|cwd| Utf8PathBuf::from_path_buf(cwd).ok());
    let manifest_dir = std::env::var(EnvVars::CARGO_MANIFEST_DIR)
        .ok()
        .map(Utf8PathBuf::from);

    let mut candidates = cwd.iter().map(|cwd| cwd.join(path)).chain(
        manifest_dir
            .iter()
            .flat_map(|dir| dir.ancestors())
            .map(|dir| dir.join(path)),
    );

    candidates
        .find(|candidate| candidate.is_file())
        .or_else(|| cwd.map(|cwd| cwd.join(path)))
        .unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NODE_TRACE: &str = "Error
    at Object.<anonymous> (/work/node_modules/snap/lib/index.js:10:5)
    at wrapper (/work/node_modules/snap/lib/index.js:20:5)
    at hook (/work/node_modules/snap/lib/index.js:30:5)
    at Context.<anonymous> (/work/test/foo.js:4:21)
    at /work/test/bar.js:5:25";

    #[test]
    fn test_named_frame() {
        let site = locate(NODE_TRACE, 3).expect("user frame");
        assert_eq!(
            site,
            CallSite {
                file: Utf8PathBuf::from("/work/test/foo.js"),
                line: 4,
                column: 21,
            }
        );
    }

    #[test]
    fn test_anonymous_frame() {
        let site = locate(NODE_TRACE, 4).expect("user frame");
        assert_eq!(site.file, "/work/test/bar.js");
        assert_eq!((site.line, site.column), (5, 25));
    }

    #[test]
    fn test_vendored_frames_are_skipped() {
        let site = locate(NODE_TRACE, 0).expect("user frame");
        assert_eq!(site.file, "/work/test/foo.js");
    }

    #[test]
    fn test_rust_backtrace() {
        let trace = "   0: snapfix::assertion::capture
             at /home/me/.cargo/registry/src/index.crates.io-6f17d22bba15001f/snapfix-0.1.0/src/assertion.rs:12:5
   1: core::ops::function::FnOnce::call_once
             at /rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/core/src/ops/function.rs:250:5
   2: my_crate::tests::it_works
             at /home/me/my_crate/src/lib.rs:40:9";
        let site = locate(trace, 0).expect("user frame");
        assert_eq!(site.to_string(), "/home/me/my_crate/src/lib.rs:40:9");
    }

    #[test]
    fn test_only_library_frames() {
        let trace = "Error
    at a (/work/node_modules/x/index.js:1:1)
    at b (/work/node_modules/x/index.js:2:1)";
        assert_eq!(locate(trace, 0), None);
    }

    #[test]
    fn test_is_vendored() {
        assert!(is_vendored("/home/me/.cargo/registry/src/x/lib.rs"));
        assert!(is_vendored("/home/me/.cargo/git/checkouts/x/lib.rs"));
        assert!(is_vendored("/rustc/abc/library/core/src/ops/function.rs"));
        assert!(is_vendored("vendor/serde/src/lib.rs"));
        assert!(!is_vendored("/home/me/vendors/src/lib.rs"));
        assert!(!is_vendored("tests/it/main.rs"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let path = if cfg!(windows) { "C:\\a\\b.rs" } else { "/a/b.rs" };
        assert_eq!(resolve_path(path), path);
    }

    #[test]
    fn test_relative_path_resolves_to_existing_file() {
        let resolved = resolve_path("src/locate.rs");
        assert!(resolved.is_absolute());
        assert!(resolved.is_file(), "{resolved} should exist");
    }

    #[test]
    fn test_from_location() {
        let site = CallSite::from_location(Location::caller()).expect("not vendored");
        assert!(site.file.is_absolute());
        assert!(site.file.is_file(), "{} should exist", site.file);
        assert!(site.file.ends_with("src/locate.rs"));
    }
}
