use std::path::Path;

use crate::error::PrepError;
use crate::utils::Invocation;

pub fn blkid_invocation(device: &Path) -> Invocation {
    Invocation::new("blkid").arg(device)
}

/// Extract the `LABEL` tag from blkid's `<device>: KEY="value" ...` output.
///
/// The device spec is everything up to the first `": "`. Quoted values run
/// to their closing quote and may contain spaces.
pub fn parse_blkid_label(output: &str) -> Result<String, PrepError> {
    let line = output
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();
    let tags = line.split_once(": ").map_or(line, |(_, tags)| tags);

    find_tag(tags, "LABEL")
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PrepError::LabelNotFound(output.trim().to_string()))
}

fn find_tag<'a>(tags: &'a str, wanted: &str) -> Option<&'a str> {
    let mut rest = tags.trim_start();
    while let Some((key, after)) = rest.split_once('=') {
        let (value, remaining) = match after.strip_prefix('"') {
            Some(quoted) => quoted.split_once('"').unwrap_or((quoted, "")),
            None => after.split_once(char::is_whitespace).unwrap_or((after, "")),
        };
        if key == wanted {
            return Some(value);
        }
        rest = remaining.trim_start();
    }
    None
}
