//! What this binary was built from and with, for the startup log and `/health`.

use std::fmt;

use serde::Serialize;

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

const UNKNOWN: &str = "unknown";

/// Crate features that change runtime behaviour: which agent backends can
/// be configured, whether digests go out over SMTP, whether the service
/// mode is compiled in.
const FEATURES: &[(&str, bool)] = &[
    ("ollama", cfg!(feature = "ollama")),
    ("google", cfg!(feature = "google")),
    ("smtp", cfg!(feature = "smtp")),
    ("server", cfg!(feature = "server")),
];

/// Build metadata, serialized as-is into the `/health` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_branch: &'static str,
    /// Abbreviated to seven characters.
    pub git_sha: &'static str,
    pub dirty: bool,
    pub built_at: &'static str,
    pub features: Vec<&'static str>,
}

impl BuildInfo {
    pub fn current() -> Self {
        let sha = option_env!("VERGEN_GIT_SHA").unwrap_or(UNKNOWN);
        Self {
            version: PKG_VERSION,
            git_branch: option_env!("VERGEN_GIT_BRANCH").unwrap_or(UNKNOWN),
            git_sha: sha.get(..7).unwrap_or(sha),
            dirty: option_env!("VERGEN_GIT_DIRTY") == Some("true"),
            built_at: option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or(UNKNOWN),
            features: FEATURES
                .iter()
                .filter(|(_, on)| *on)
                .map(|(name, _)| *name)
                .collect(),
        }
    }
}

/// `0.1.0+main.abc1234`, with `.dirty` appended for uncommitted builds.
impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}.{}", self.version, self.git_branch, self.git_sha)?;
        if self.dirty {
            f.write_str(".dirty")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(dirty: bool) -> BuildInfo {
        BuildInfo {
            version: "0.3.1",
            git_branch: "main",
            git_sha: "abc1234",
            dirty,
            built_at: "2026-01-01T00:00:00Z",
            features: vec!["ollama", "server"],
        }
    }

    #[test]
    fn display_joins_version_branch_and_sha() {
        assert_eq!(info(false).to_string(), "0.3.1+main.abc1234");
        assert_eq!(info(true).to_string(), "0.3.1+main.abc1234.dirty");
    }

    #[test]
    fn current_reports_package_version_and_short_sha() {
        let build = BuildInfo::current();
        assert_eq!(build.version, PKG_VERSION);
        assert!(build.git_sha.len() <= 7);
        assert!(build.to_string().starts_with(PKG_VERSION));
    }

    #[test]
    fn features_follow_cfg() {
        let build = BuildInfo::current();
        assert_eq!(build.features.contains(&"smtp"), cfg!(feature = "smtp"));
        assert_eq!(build.features.contains(&"server"), cfg!(feature = "server"));
    }

    #[test]
    fn serializes_for_health() {
        let value = serde_json::to_value(info(true)).unwrap();
        assert_eq!(value["git_sha"], "abc1234");
        assert_eq!(value["dirty"], true);
        assert_eq!(value["features"], serde_json::json!(["ollama", "server"]));
    }
}
