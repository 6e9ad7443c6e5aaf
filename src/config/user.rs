//! User configuration location for tagwise.
//!
//! User config location: $XDG_CONFIG_HOME/tagwise/tagwise.toml
//! Fallback: the platform config directory (`dirs::config_dir`)

use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "tagwise.toml";

/// Returns the path to the user configuration file.
///
/// The path is determined by:
/// 1. If $XDG_CONFIG_HOME is set: $XDG_CONFIG_HOME/tagwise/tagwise.toml
/// 2. Otherwise: <platform config dir>/tagwise/tagwise.toml
///
/// Returns None if no config directory can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)?;
    Some(base.join("tagwise").join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn user_config_path_uses_xdg_config_home_when_set() {
        let original = env::var("XDG_CONFIG_HOME").ok();

        // SAFETY: no other unit test reads XDG_CONFIG_HOME
        unsafe {
            env::set_var("XDG_CONFIG_HOME", "/custom/config");
        }

        let path = user_config_path();

        // SAFETY: restoring the original env state
        unsafe {
            match original {
                Some(val) => env::set_var("XDG_CONFIG_HOME", val),
                None => env::remove_var("XDG_CONFIG_HOME"),
            }
        }

        assert_eq!(
            path,
            Some(PathBuf::from("/custom/config/tagwise/tagwise.toml")),
            "should use XDG_CONFIG_HOME/tagwise/tagwise.toml"
        );
    }
}
