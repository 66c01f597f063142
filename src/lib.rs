use std::error::Error;

pub mod api;
pub mod articles;
pub mod assets;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod github;
pub mod handler;
pub mod media;
pub mod posts;
pub mod validate;

pub fn unpack_error(err: &(dyn Error)) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

/// Public URL of a file on the raw content host for the given branch.
pub fn raw_content_url(owner: &str, repo: &str, branch: &str, path: &str) -> String {
    let encoded = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "https://raw.githubusercontent.com/{}/{}/{}/{}",
        owner, repo, branch, encoded
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_content_url_encodes_path_segments() {
        assert_eq!(
            raw_content_url("acme", "site", "main", "content/media/summer shot.png"),
            "https://raw.githubusercontent.com/acme/site/main/content/media/summer%20shot.png"
        );
    }
}
