use std::path::PathBuf;

use directories::ProjectDirs;

const PROJECT_ROOT: &str = env!("CARGO_MANIFEST_DIR");

/// Directory holding the database, logs and generated files.
///
/// Debug builds keep everything under `dev_assets/` in the workspace so a
/// developer can wipe state with `rm -rf`. Release builds use the platform
/// data directory (`~/.local/share/agency` on Linux).
pub fn asset_dir() -> PathBuf {
    if let Ok(path) = std::env::var("AGENCY_ASSET_DIR") {
        return PathBuf::from(path);
    }

    if cfg!(debug_assertions) {
        PathBuf::from(PROJECT_ROOT).join("../../dev_assets")
    } else {
        ProjectDirs::from("studio", "agency", "agency")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".agency"))
    }
}

/// Default SQLite file location, overridable with `AGENCY_DATABASE_PATH`.
pub fn database_path() -> PathBuf {
    std::env::var("AGENCY_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| asset_dir().join("agency.sqlite"))
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn database_path_respects_override() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("custom.sqlite");
        // SAFETY: tests touching the environment are serialized.
        unsafe { std::env::set_var("AGENCY_DATABASE_PATH", &custom) };
        assert_eq!(database_path(), custom);
        unsafe { std::env::remove_var("AGENCY_DATABASE_PATH") };
    }

    #[test]
    #[serial]
    fn asset_dir_override_wins() {
        unsafe { std::env::set_var("AGENCY_ASSET_DIR", "/tmp/agency-assets") };
        assert_eq!(asset_dir(), PathBuf::from("/tmp/agency-assets"));
        assert_eq!(
            database_path(),
            PathBuf::from("/tmp/agency-assets/agency.sqlite")
        );
        unsafe { std::env::remove_var("AGENCY_ASSET_DIR") };
    }
}
