use semver::Version;

pub const EXTENSION_DIR_PREFIX: &str = "openai.chatgpt-";

/// Parses a plain `MAJOR.MINOR.PATCH` triple.
///
/// Pre-release tags, build metadata and missing components are rejected, which is stricter than
/// `Version::parse`. Leading zeros are accepted since install folders have been seen with them.
pub fn parse_release_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let parts = trimmed.split('.').collect::<Vec<_>>();
    if parts.len() != 3 {
        return None;
    }
    numeric_triple(&parts)
}

/// Reads the version embedded in an install folder name such as
/// `openai.chatgpt-0.4.71-win32-x64`.
pub fn version_from_dir_name(name: &str) -> Option<Version> {
    let rest = name.strip_prefix(EXTENSION_DIR_PREFIX)?;
    let leading = rest
        .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
        .map_or(rest, |end| &rest[..end]);
    let parts = leading.split('.').take(3).collect::<Vec<_>>();
    if parts.len() != 3 {
        return None;
    }
    numeric_triple(&parts)
}

fn numeric_triple(parts: &[&str]) -> Option<Version> {
    let mut numbers = [0_u64; 3];
    for (slot, part) in numbers.iter_mut().zip(parts) {
        if part.is_empty() || !part.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    Some(Version::new(numbers[0], numbers[1], numbers[2]))
}
