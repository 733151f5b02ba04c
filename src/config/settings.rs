//! Loading of the layered INI settings source.
//!
//! Settings live in `toptranslation.ini`, scoped by a profile (site) name per
//! INI section. The file is searched in the usual places unless an explicit
//! path is supplied: `$XDG_CONFIG_HOME` (or `$HOME/.config`), then the
//! working directory.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use config::FileFormat;

use crate::error::ClientError;

/// File name of the settings source.
pub const FILE_NAME: &str = "toptranslation.ini";

/// Returns the search locations for the settings file, in precedence order.
pub(crate) fn default_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Ok(dir) = env::var("XDG_CONFIG_HOME") {
        locations.push(Path::new(&dir).join(FILE_NAME));
    } else if let Ok(home) = env::var("HOME") {
        locations.push(Path::new(&home).join(".config").join(FILE_NAME));
    }
    locations.push(PathBuf::from(FILE_NAME));
    locations
}

/// Returns the first existing settings file among the default locations.
pub(crate) fn find_settings_file() -> Option<PathBuf> {
    default_locations().into_iter().find(|path| path.exists())
}

/// Loads the named profile section from an INI settings file.
///
/// # Errors
///
/// Returns [`ClientError::MissingProfile`] when the section is absent and
/// [`ClientError::InvalidSetting`] when the file cannot be parsed.
pub(crate) fn load_profile(
    path: &Path,
    site: &str,
) -> Result<HashMap<String, String>, ClientError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path).format(FileFormat::Ini))
        .build()
        .map_err(|source| ClientError::InvalidSetting {
            key: "config_file",
            reason: source.to_string(),
        })?;

    let section = settings
        .get_table(site)
        .map_err(|_| ClientError::MissingProfile {
            site: site.to_string(),
        })?;

    let mut profile = HashMap::with_capacity(section.len());
    for (key, value) in section {
        let value = value
            .into_string()
            .map_err(|source| ClientError::InvalidSetting {
                key: "config_file",
                reason: source.to_string(),
            })?;
        profile.insert(key, value);
    }
    Ok(profile)
}

/// Reads a proxy URL for the given scheme from the process environment.
pub(crate) fn env_proxy(scheme: &str) -> Option<String> {
    env::var(format!("{scheme}_proxy"))
        .ok()
        .filter(|value| !value.is_empty())
}
