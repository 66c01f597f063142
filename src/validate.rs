//! Field validation shared by the article and post pipelines, plus the
//! image checks run before an upload is accepted.

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_TAGS: usize = 10;

pub fn validate_title(title: &str, errors: &mut Vec<String>) {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        errors.push("title: must not be empty".to_string());
        return;
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        errors.push(format!("title: must be at most {} characters", MAX_TITLE_LEN));
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        errors.push("title: must not be numeric-only".to_string());
    }
}

fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub fn validate_tags(tags: &[String], errors: &mut Vec<String>) {
    if tags.len() > MAX_TAGS {
        errors.push(format!("tags: at most {} tags allowed", MAX_TAGS));
    }
    for tag in tags {
        if !is_valid_tag(tag) {
            errors.push(format!(
                "tags: '{}' must match [a-zA-Z0-9_-]+",
                tag
            ));
        }
    }
}

pub fn validate_cover_image(url: &str, errors: &mut Vec<String>) {
    if !url.starts_with("https://") {
        errors.push("cover_image: must be an https:// url".to_string());
    }
}

/// Derives a url-safe slug from a title. Runs of non-alphanumeric characters
/// collapse into a single hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// True when `slug` is something [`slugify`] could have produced. Route
/// params are checked against this before they are spliced into a
/// repository path, so `..` or `/` never reach the contents API.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Strips any path components from a client-supplied filename.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

pub fn is_allowed_image_type(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

/// Checks that the leading bytes carry the signature of the declared type.
/// Unknown declared types never match.
pub fn magic_bytes_match(content_type: &str, data: &[u8]) -> bool {
    match content_type {
        "image/png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
        "image/jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        "image/gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
        "image/webp" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_errors(title: &str) -> Vec<String> {
        let mut errors = Vec::new();
        validate_title(title, &mut errors);
        errors
    }

    #[test]
    fn rejects_empty_and_whitespace_titles() {
        assert!(!title_errors("").is_empty());
        assert!(!title_errors("   ").is_empty());
    }

    #[test]
    fn rejects_overlong_titles() {
        let long = "a".repeat(MAX_TITLE_LEN + 1);
        assert!(!title_errors(&long).is_empty());
        let fits = "a".repeat(MAX_TITLE_LEN);
        assert!(title_errors(&fits).is_empty());
    }

    #[test]
    fn rejects_numeric_only_titles_even_padded() {
        assert!(!title_errors("12345").is_empty());
        assert!(!title_errors("  12345  ").is_empty());
        assert!(title_errors("1984 revisited").is_empty());
    }

    #[test]
    fn rejects_bad_tags_and_caps_count() {
        let mut errors = Vec::new();
        validate_tags(&["ok-tag_1".to_string(), "bad tag".to_string()], &mut errors);
        assert_eq!(errors.len(), 1);

        let mut errors = Vec::new();
        let many: Vec<String> = (0..11).map(|i| format!("t{}", i)).collect();
        validate_tags(&many, &mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn rejects_non_https_cover() {
        let mut errors = Vec::new();
        validate_cover_image("http://cdn.example.com/x.png", &mut errors);
        assert_eq!(errors.len(), 1);

        let mut errors = Vec::new();
        validate_cover_image("https://cdn.example.com/x.png", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn slugifies_titles() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust & Friends  "), "rust-friends");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn slug_charset_is_enforced() {
        assert!(is_valid_slug("hello-world"));
        assert!(is_valid_slug("a1"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("../../etc/passwd"));
        assert!(!is_valid_slug("a/b"));
        assert!(!is_valid_slug("Hello"));
        assert!(!is_valid_slug("a b"));
        assert!(is_valid_slug(&slugify("Hello, World!")));
    }

    #[test]
    fn sanitizes_filenames() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("photo (1).png"), "photo__1_.png");
        assert_eq!(sanitize_filename("C:\\temp\\shot.jpg"), "shot.jpg");
    }

    #[test]
    fn magic_bytes_must_match_declared_type() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert!(magic_bytes_match("image/png", &png));
        assert!(!magic_bytes_match("image/jpeg", &png));

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert!(magic_bytes_match("image/jpeg", &jpeg));

        let webp = *b"RIFF\x10\x00\x00\x00WEBPVP8 ";
        assert!(magic_bytes_match("image/webp", &webp));
        assert!(!magic_bytes_match("image/webp", b"RIFFxxxxWAVE"));

        assert!(!magic_bytes_match("image/svg+xml", b"<svg/>"));
    }
}
