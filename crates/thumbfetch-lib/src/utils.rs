pub fn sanitize_file_component(component: &str) -> String {
    component
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

pub fn is_absolute_url(fragment: &str) -> bool {
    fragment.starts_with("http://") || fragment.starts_with("https://")
}

/// Joins a base origin and a rendition URL fragment with exactly one slash.
pub fn resolve_url(base_origin: &str, fragment: &str) -> String {
    if is_absolute_url(fragment) {
        return fragment.to_string();
    }
    format!(
        "{}/{}",
        base_origin.trim_end_matches('/'),
        fragment.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_component_keeps_safe_characters() {
        assert_eq!(sanitize_file_component("HK-2024_abc09"), "HK-2024_abc09");
    }

    #[test]
    fn test_sanitize_file_component_replaces_path_separators() {
        assert_eq!(sanitize_file_component("../etc/passwd"), "___etc_passwd");
        assert_eq!(sanitize_file_component("a b\\c"), "a_b_c");
    }

    #[test]
    fn test_resolve_url_relative_fragment() {
        assert_eq!(
            resolve_url("https://photos.example.com/", "/img/p1.jpg"),
            "https://photos.example.com/img/p1.jpg"
        );
        assert_eq!(
            resolve_url("https://photos.example.com", "img/p1.jpg"),
            "https://photos.example.com/img/p1.jpg"
        );
    }

    #[test]
    fn test_resolve_url_absolute_fragment() {
        assert_eq!(
            resolve_url("https://photos.example.com/", "https://cdn.example.com/p1.jpg"),
            "https://cdn.example.com/p1.jpg"
        );
    }
}
