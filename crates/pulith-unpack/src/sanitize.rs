//! Lexical path sanitization for archive entry names.
//!
//! This is a string transform, not a chroot: it never touches the filesystem
//! and cannot see symlinks already present under the destination.

/// Sanitize an entry name, stripping volume prefixes.
pub fn sanitize(name: &str) -> String { sanitize_with(name, true) }

/// Sanitize an entry name into a relative, `..`-free, forward-slash path.
///
/// Never fails. The worst case is `"."`, the destination root itself.
pub fn sanitize_with(name: &str, strip_volume_prefix: bool) -> String {
    let mut sanitized = sanitize_once(name, strip_volume_prefix);
    // A volume prefix can surface after cleaning, e.g. `./C:x`.
    while strip_volume_prefix && has_volume_prefix(&sanitized) {
        sanitized = sanitize_once(&sanitized, true);
    }
    sanitized
}

fn sanitize_once(name: &str, strip_volume_prefix: bool) -> String {
    let name = if strip_volume_prefix && has_volume_prefix(name) {
        &name[2..]
    } else {
        name
    };

    let cleaned = clean(&name.replace('\\', "/"));

    let mut relative = cleaned.trim_start_matches('/');
    while let Some(rest) = relative.strip_prefix("../") {
        relative = rest;
    }

    match relative {
        "" | ".." => ".".to_string(),
        _ => relative.to_string(),
    }
}

fn has_volume_prefix(name: &str) -> bool {
    matches!(name.as_bytes(), [drive, b':', ..] if drive.is_ascii_alphabetic())
}

/// Lexically collapse `.`, `..` and repeated separators.
fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}
