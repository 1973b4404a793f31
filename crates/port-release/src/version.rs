//! Release tags and semantic versions

use regex::Regex;
use std::sync::LazyLock;

static SEMVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:-([a-zA-Z0-9.]+))?(?:\+([a-zA-Z0-9.]+))?$")
        .expect("semver pattern is valid")
});

/// Strip one leading literal `v` from a release tag.
///
/// `v1.2.3` becomes `1.2.3`; `vv1` becomes `v1`; tags without the prefix are
/// returned unchanged.
pub fn strip_tag_prefix(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`, without a tag prefix
pub fn is_semver(version: &str) -> bool {
    SEMVER.is_match(version)
}
