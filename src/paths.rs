// src/paths.rs
//! Lexical path helpers.
//!
//! The engine never touches the filesystem during resolution, so all path
//! work is string-level: forward slashes, `.`/`..` collapsed, no leading `./`.

/// Normalizes a path string: backslashes to `/`, `.` segments dropped,
/// `..` segments collapsed against their parent where possible.
#[must_use]
pub fn normalize(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    let mut out: Vec<&str> = Vec::new();
    for seg in replaced.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if out.last().is_some_and(|s| *s != "..") {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            _ => out.push(seg),
        }
    }
    out.join("/")
}

/// Joins a relative path onto a directory and normalizes the result.
#[must_use]
pub fn join(dir: &str, rel: &str) -> String {
    if dir.is_empty() {
        return normalize(rel);
    }
    normalize(&format!("{dir}/{rel}"))
}

/// Parent directory of a path, `""` for top-level files.
#[must_use]
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// File name component of a path.
#[must_use]
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Lowercased extension without the dot, `""` when absent.
#[must_use]
pub fn extension(path: &str) -> String {
    let name = basename(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx + 1..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// True when `path` is `dir` itself or sits anywhere below it.
#[must_use]
pub fn is_under(path: &str, dir: &str) -> bool {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        return true;
    }
    path == dir || path.starts_with(&format!("{dir}/"))
}

/// True when any `/`-separated segment of `path` equals `segment`.
#[must_use]
pub fn has_segment(path: &str, segment: &str) -> bool {
    path.split('/').any(|s| s == segment)
}
