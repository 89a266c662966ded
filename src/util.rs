/// Dropbox paths are absolute without a trailing slash; the root is `""`.
pub fn pathify(path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    match path.strip_suffix('/') {
        Some(trimmed) => trimmed.to_string(),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pathify_adds_leading_and_drops_trailing_slash() {
        assert_eq!(pathify("foo/bar/"), "/foo/bar");
        assert_eq!(pathify("/foo"), "/foo");
        assert_eq!(pathify("foo"), "/foo");
    }

    #[test]
    fn pathify_maps_root_to_empty() {
        assert_eq!(pathify("/"), "");
        assert_eq!(pathify(""), "");
    }
}
