// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "wrigs-fashion";

/// Environment variable that pins the data directory outright.
pub const DATA_DIR_ENV: &str = "WRIGS_DATA_DIR";

/// Return the application data directory, creating it if needed.
///
/// Holds `config.json`. The static tree (uploads, PDFs, artwork) is
/// configured separately through `AppConfig::static_dir`.
pub fn data_dir() -> PathBuf {
    let dir = resolve(
        std::env::var_os(DATA_DIR_ENV).map(PathBuf::from),
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    );
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// Default location of the configuration file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

fn resolve(overridden: Option<PathBuf>, xdg: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = overridden {
        return dir;
    }
    // Try XDG data dir, then fallback to home
    if let Some(xdg) = xdg {
        return xdg.join(APP_DIR);
    }
    if let Some(home) = home {
        return home.join(".local").join("share").join(APP_DIR);
    }
    // Last resort
    Path::new("/tmp").join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins() {
        let dir = resolve(
            Some("/srv/wrigs".into()),
            Some("/xdg".into()),
            Some("/home/kid".into()),
        );
        assert_eq!(dir, PathBuf::from("/srv/wrigs"));
    }

    #[test]
    fn xdg_then_home_then_tmp() {
        assert_eq!(
            resolve(None, Some("/xdg".into()), Some("/home/kid".into())),
            PathBuf::from("/xdg/wrigs-fashion")
        );
        assert_eq!(
            resolve(None, None, Some("/home/kid".into())),
            PathBuf::from("/home/kid/.local/share/wrigs-fashion")
        );
        assert_eq!(resolve(None, None, None), PathBuf::from("/tmp/wrigs-fashion"));
    }
}
