use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Not valid percent-encoded UTF-8, or contains NUL.
    Malformed,
    /// Tries to leave the served directory.
    Traversal,
}

/// Turns a request path into a path relative to the served directory.
pub fn resolve(uri_path: &str) -> Result<PathBuf, Rejection> {
    let decoded = percent_decode_str(uri_path)
        .decode_utf8()
        .map_err(|_| Rejection::Malformed)?;
    if decoded.contains('\0') {
        return Err(Rejection::Malformed);
    }

    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(Rejection::Traversal),
            _ => {}
        }
        // e.g. `C:` or `a\..` on windows
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => relative.push(part),
            _ => return Err(Rejection::Traversal),
        }
    }
    Ok(relative)
}

/// Percent-decoded request path, for display only.
pub fn decode_lossy(uri_path: &str) -> String {
    percent_decode_str(uri_path).decode_utf8_lossy().into_owned()
}
