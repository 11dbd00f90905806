//! Resolution of matching master bias/dark files for a set of inputs.

use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use tracing::{debug, error, warn};

use crate::error::{Result, StoneStepsError};
use crate::header::{Header, HeaderValue};
use crate::io::fits::read_fits_header;

use super::config::AuxFileConfig;

/// Find the `kind` calibration file for inputs whose first header is
/// `reference`.
///
/// Candidates are the files matching the glob `config.pattern`, sorted by
/// path. A relative pattern is taken from `base_dir`. The
/// first candidate whose `fit_keys` all match `reference` wins. When none
/// matches, the last key is dropped (with a warning) and the search repeats,
/// down to no keys at all. No candidate at all is an `EmptyInput` error.
pub fn resolve_aux(
    kind: &str,
    config: &AuxFileConfig,
    reference: &Header,
    base_dir: &Path,
) -> Result<PathBuf> {
    let expanded = expand_vars(&config.pattern);
    let pattern = if Path::new(&expanded).is_relative() {
        // the base folder is literal text, only the configured part is a pattern
        let base = Pattern::escape(&base_dir.to_string_lossy());
        Path::new(&base).join(&expanded).to_string_lossy().into_owned()
    } else {
        expanded
    };

    let candidates = list_matching(&pattern)?;
    if candidates.is_empty() {
        error!("No {} calibration frames found matching {}", kind, pattern);
        return Err(StoneStepsError::EmptyInput(kind.into()));
    }

    let headers: Vec<(PathBuf, Header)> = candidates
        .into_iter()
        .filter_map(|path| match read_fits_header(&path) {
            Ok(h) => Some((path, h)),
            Err(e) => {
                warn!("Skipping unreadable {} candidate {}: {}", kind, path.display(), e);
                None
            }
        })
        .collect();

    let mut keys: Vec<&str> = config.fit_keys.iter().map(String::as_str).collect();
    loop {
        if let Some((path, _)) = headers
            .iter()
            .find(|(_, h)| keys.iter().all(|k| values_match(reference.get(k), h.get(k))))
        {
            debug!("Selected {} file {} (keys {:?})", kind, path.display(), keys);
            return Ok(path.clone());
        }
        let tried = keys.clone();
        match keys.pop() {
            Some(dropped) => warn!(
                "No {} file matches keys {:?}; retrying without {}",
                kind, tried, dropped
            ),
            None => break,
        }
    }

    error!("No readable {} calibration frame matching {}", kind, pattern);
    Err(StoneStepsError::EmptyInput(kind.into()))
}

/// Two header values match when both are absent, both are numerically
/// equal, or both print the same.
fn values_match(a: Option<&HeaderValue>, b: Option<&HeaderValue>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.to_string().trim() == b.to_string().trim(),
        },
        _ => false,
    }
}

/// Regular files matching a glob pattern, sorted by path.
fn list_matching(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).map_err(|e| {
        StoneStepsError::InvalidConfig(format!("invalid file pattern '{pattern}': {e}"))
    })?;

    let mut matches = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => matches.push(path),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable path {}: {}", e.path().display(), e.error()),
        }
    }
    matches.sort();
    Ok(matches)
}

/// Expand `$VAR`, `${VAR}` and a leading `~`. Variables that are not set
/// are kept verbatim.
pub fn expand_vars(input: &str) -> String {
    shellexpand::full_with_context_no_errors(
        input,
        || dirs::home_dir().map(|home| home.to_string_lossy().into_owned()),
        |name: &str| std::env::var(name).ok(),
    )
    .into_owned()
}

/// Expand variables in every component of a configured path.
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(expand_vars(&path.to_string_lossy()))
}
