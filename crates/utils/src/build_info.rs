use std::fmt;

use serde::Serialize;

/// What the running agency-server binary was built from, reported by
/// `/api/health` and logged at startup.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_commit: &'static str,
    pub build_timestamp: &'static str,
    /// `production`, `staging`, ... as passed by the deploy pipeline.
    pub deployment: &'static str,
}

macro_rules! option_env_or {
    ($name:expr, $default:expr) => {
        match option_env!($name) {
            Some(v) => v,
            None => $default,
        }
    };
}

pub const BUILD_INFO: BuildInfo = BuildInfo {
    version: env!("CARGO_PKG_VERSION"),
    git_commit: option_env_or!("AGENCY_GIT_COMMIT", "unknown"),
    build_timestamp: option_env_or!("AGENCY_BUILD_TIMESTAMP", "unknown"),
    deployment: option_env_or!("AGENCY_DEPLOYMENT", "local"),
};

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "agency-server {} ({}, {}) built {}",
            self.version, self.git_commit, self.deployment, self.build_timestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_version_and_deployment() {
        let info = BuildInfo {
            version: "1.2.0",
            git_commit: "9f3c2ab",
            build_timestamp: "2025-03-12T08:00:00Z",
            deployment: "staging",
        };
        assert_eq!(
            info.to_string(),
            "agency-server 1.2.0 (9f3c2ab, staging) built 2025-03-12T08:00:00Z"
        );
        assert!(!BUILD_INFO.deployment.is_empty());
    }
}
