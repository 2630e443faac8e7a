//! Connection profiles: a TOML file mapping profile name -> { listen, status }.
//! Stored under XDG config dir: $XDG_CONFIG_HOME/fpmtop/fpmtop.toml (fallback ~/.config/fpmtop/fpmtop.toml)

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, io, path::Path, path::PathBuf};
use tracing::info;

use crate::errors::ProfileError;

pub const DEFAULT_PROFILE: &str = "default";

/// Written on first run when no configuration file exists.
pub const DEFAULT_CONFIG: &str = r#"# The default profile is used when fpmtop is started without arguments.
[default]
listen = "/var/run/php-fpm.sock"    # The value of the "listen" option in the PHP-FPM pool config.
status = "/status"                  # The value of the "pm.status_path" option.
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    /// Unix socket path (starts with `/`) or `host:port`.
    pub listen: String,
    pub status: String,
}

pub type ProfilesFile = BTreeMap<String, ProfileEntry>;

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("fpmtop")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fpmtop")
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("fpmtop.toml")
}

pub fn parse_profiles(path: &Path, text: &str) -> Result<ProfilesFile, ProfileError> {
    toml::from_str(text).map_err(|source| ProfileError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the profile file. A missing file is replaced with [`DEFAULT_CONFIG`]
/// and reported as [`ProfileError::Bootstrapped`] so the user can review it.
pub fn load_profiles(path: &Path) -> Result<ProfilesFile, ProfileError> {
    match fs::read_to_string(path) {
        Ok(text) => parse_profiles(path, &text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            write_default(path)?;
            info!(path = %path.display(), "default configuration written");
            Err(ProfileError::Bootstrapped {
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(ProfileError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_default(path: &Path) -> Result<(), ProfileError> {
    let io_err = |source: io::Error| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, DEFAULT_CONFIG).map_err(io_err)
}

pub fn select_profile(pf: &ProfilesFile, name: &str) -> Result<ProfileEntry, ProfileError> {
    pf.get(name)
        .cloned()
        .ok_or_else(|| ProfileError::MissingProfile(name.to_string()))
}
