//! URL composition.
//!
//! Joining rules, used both for request URLs and redirect targets:
//! - an empty relative part leaves the base unchanged;
//! - a part containing `://` replaces the URL outright;
//! - a part starting with `/` is an absolute path on the base's origin;
//! - anything else is appended to the base with exactly one `/` between.
//!
//! Names are used verbatim: no trailing-slash normalisation in either part.

pub fn join_url(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_string();
    }
    if relative.contains("://") {
        return relative.to_string();
    }
    if relative.starts_with('/') {
        return format!("{}{}", origin(base), relative);
    }
    format!("{}/{}", base.trim_end_matches('/'), relative)
}

/// `scheme://authority` of an absolute URL, or `""` for a bare path.
fn origin(url: &str) -> &str {
    let Some(idx) = url.find("://") else {
        return "";
    };
    let after = idx + 3;
    match url.get(after..).and_then(|rest| rest.find('/')) {
        Some(slash) => url.get(..after + slash).unwrap_or(url),
        None => url,
    }
}
