//! Build identity reported by `termsumd --version` and `GET /api/health`.
//!
//! Git and build metadata are injected by `build.rs`; builds outside a git
//! checkout fall back to `unknown`.

use std::fmt;

use serde::Serialize;

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

const UNKNOWN: &str = "unknown";

/// Where and when this binary was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub branch: &'static str,
    pub commit: &'static str,
    pub dirty: bool,
    pub built_at: Option<&'static str>,
}

impl BuildInfo {
    /// Metadata captured for the running binary.
    pub const fn current() -> Self {
        Self {
            version: PKG_VERSION,
            branch: or_unknown(option_env!("VERGEN_GIT_BRANCH")),
            commit: or_unknown(option_env!("VERGEN_GIT_SHA")),
            dirty: is_true(option_env!("VERGEN_GIT_DIRTY")),
            built_at: option_env!("VERGEN_BUILD_TIMESTAMP"),
        }
    }

    /// First seven characters of the commit hash.
    pub fn short_commit(&self) -> &'static str {
        self.commit.get(..7).unwrap_or(self.commit)
    }
}

const fn or_unknown(value: Option<&'static str>) -> &'static str {
    match value {
        Some(v) => v,
        None => UNKNOWN,
    }
}

const fn is_true(value: Option<&'static str>) -> bool {
    match value {
        Some(v) => matches!(v.as_bytes(), b"true"),
        None => false,
    }
}

/// `{version}+{branch}.{commit}`, with `.dirty` appended for builds from a
/// modified tree.
impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}.{}", self.version, self.branch, self.short_commit())?;
        if self.dirty {
            f.write_str(".dirty")?;
        }
        Ok(())
    }
}

/// Full version string of the running binary, e.g. `0.1.0+main.abc1234`.
pub fn version_string() -> String {
    BuildInfo::current().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(commit: &'static str, dirty: bool) -> BuildInfo {
        BuildInfo {
            version: "0.1.0",
            branch: "main",
            commit,
            dirty,
            built_at: None,
        }
    }

    #[test]
    fn display_shortens_commit() {
        assert_eq!(
            info("abc1234def5678", false).to_string(),
            "0.1.0+main.abc1234"
        );
    }

    #[test]
    fn dirty_tree_is_marked() {
        assert_eq!(info("abc1234", true).to_string(), "0.1.0+main.abc1234.dirty");
    }

    #[test]
    fn missing_git_metadata_reads_unknown() {
        assert_eq!(info(UNKNOWN, false).to_string(), "0.1.0+main.unknown");
    }

    #[test]
    fn version_string_starts_with_package_version() {
        assert!(version_string().starts_with(PKG_VERSION));
    }
}
