use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::Github;
use crate::error::{ContentError, GithubError};
use crate::github::GithubClient;
use crate::validate;

const DIGEST_PREFIX_LEN: usize = 12;

// Multipart boundaries and part headers ride along with the file bytes.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Request body limit for the upload route. The default axum limit is
/// smaller than the configured cap, so without this the framework rejects
/// big uploads before the size validation ever sees them.
pub fn body_limit(max_size_bytes: usize) -> usize {
    max_size_bytes + MULTIPART_OVERHEAD
}

#[derive(Debug, Serialize)]
pub struct MediaItem {
    pub name: String,
    /// Original filename, without the digest prefix.
    pub file_name: String,
    pub path: String,
    pub size: u64,
    pub download_url: Option<String>,
}

/// Media keys are `{sha256-prefix}_{original-name}`, so re-uploading the
/// same bytes under the same name lands on the same path.
fn build_key(digest: &str, file_name: &str) -> String {
    format!("{}_{}", digest, file_name)
}

pub fn parse_key(key: &str) -> Option<(&str, &str)> {
    let underscore_pos = key.find('_')?;
    if underscore_pos != DIGEST_PREFIX_LEN {
        return None;
    }
    Some((&key[..DIGEST_PREFIX_LEN], &key[DIGEST_PREFIX_LEN + 1..]))
}

fn content_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)[..DIGEST_PREFIX_LEN].to_string()
}

pub struct MediaLibrary<'a> {
    github: &'a GithubClient,
    cfg: &'a Github,
    max_size_bytes: usize,
}

impl<'a> MediaLibrary<'a> {
    pub fn new(github: &'a GithubClient, cfg: &'a Github, max_size_bytes: usize) -> Self {
        Self {
            github,
            cfg,
            max_size_bytes,
        }
    }

    fn item_path(&self, key: &str) -> String {
        format!("{}/{}", self.cfg.media_dir, key)
    }

    fn raw_url(&self, path: &str) -> String {
        crate::raw_content_url(&self.cfg.owner, &self.cfg.repo, &self.cfg.branch, path)
    }

    fn validate_upload(&self, content_type: &str, bytes: &[u8]) -> Result<(), ContentError> {
        let mut errors = Vec::new();
        if !validate::is_allowed_image_type(content_type) {
            errors.push(format!("file: '{}' is not an accepted image type", content_type));
        } else if !validate::magic_bytes_match(content_type, bytes) {
            errors.push(format!("file: content does not match declared type '{}'", content_type));
        }
        if bytes.len() > self.max_size_bytes {
            errors.push(format!(
                "file: {} bytes exceeds the {} byte upload cap",
                bytes.len(),
                self.max_size_bytes
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ContentError::Validation(errors))
        }
    }

    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<MediaItem, ContentError> {
        self.validate_upload(content_type, bytes)?;

        let name = validate::sanitize_filename(file_name);
        if name.is_empty() || name.chars().all(|c| c == '.') {
            return Err(ContentError::Validation(vec![
                "file: missing a usable filename".to_string(),
            ]));
        }

        let key = build_key(&content_digest(bytes), &name);
        let path = self.item_path(&key);
        let message = format!("redaktion: upload media {}", key);

        match self.github.put_file(&path, bytes, &message, None).await {
            Ok(_) => {}
            // Same digest and name means the identical file is already in
            // the library, so the upload is a no-op.
            Err(GithubError::ShaConflict(_)) => {
                tracing::info!("media '{}' already present, skipping write", key);
            }
            Err(e) => return Err(e.into()),
        }

        Ok(MediaItem {
            name: key,
            file_name: name,
            download_url: Some(self.raw_url(&path)),
            path,
            size: bytes.len() as u64,
        })
    }

    pub async fn list(&self) -> Result<Vec<MediaItem>, ContentError> {
        let entries = match self.github.list_dir(&self.cfg.media_dir).await {
            Ok(entries) => entries,
            Err(GithubError::NotFound(_)) => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        Ok(entries
            .into_iter()
            .filter(|entry| entry.entry_type == "file")
            .map(|entry| {
                // Files placed in the directory by hand have no digest
                // prefix; show their name as-is.
                let file_name = match parse_key(&entry.name) {
                    Some((_, original)) => original.to_string(),
                    None => entry.name.clone(),
                };
                MediaItem {
                    name: entry.name,
                    file_name,
                    download_url: entry.download_url,
                    path: entry.path,
                    size: entry.size,
                }
            })
            .collect())
    }

    pub async fn delete(&self, name: &str) -> Result<(), ContentError> {
        let name = validate::sanitize_filename(name);
        let path = self.item_path(&name);
        let file = match self.github.get_file(&path).await {
            Ok(file) => file,
            Err(GithubError::NotFound(_)) => {
                return Err(ContentError::NotFound(format!("media '{}'", name)));
            }
            Err(e) => return Err(e.into()),
        };
        let message = format!("redaktion: delete media {}", name);
        self.github.delete_file(&path, &message, &file.sha).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x01];

    fn library_cfg() -> Github {
        Github {
            token: "t".to_string(),
            owner: "acme".to_string(),
            repo: "site".to_string(),
            branch: "main".to_string(),
            articles_dir: "content/articles".to_string(),
            posts_dir: "content/posts".to_string(),
            media_dir: "content/media".to_string(),
            api_base: "https://api.github.com".to_string(),
        }
    }

    #[test]
    fn body_limit_leaves_headroom_for_multipart_framing() {
        let cap = 5 * 1024 * 1024;
        assert!(body_limit(cap) > cap);
        // A file right at the cap must fit through the body limit so the
        // validator, not the framework, is what decides acceptance.
        assert!(body_limit(cap) - cap >= 1024);
    }

    #[test]
    fn keys_parse_back_to_digest_and_name() {
        let digest = content_digest(PNG);
        assert_eq!(digest.len(), DIGEST_PREFIX_LEN);
        let key = build_key(&digest, "cover.png");
        let (parsed_digest, parsed_name) = parse_key(&key).unwrap();
        assert_eq!(parsed_digest, digest);
        assert_eq!(parsed_name, "cover.png");
    }

    #[test]
    fn parse_key_rejects_foreign_names() {
        assert!(parse_key("no-digest-here.png").is_none());
        assert!(parse_key("short_name.png").is_none());
    }

    #[test]
    fn same_bytes_same_key() {
        assert_eq!(content_digest(PNG), content_digest(PNG));
        assert_ne!(content_digest(PNG), content_digest(b"other bytes"));
    }

    #[test]
    fn validates_type_size_and_magic() {
        let cfg = library_cfg();
        let github = GithubClient::new(&cfg).unwrap();
        let lib = MediaLibrary::new(&github, &cfg, 4);

        // Size cap.
        let err = lib.validate_upload("image/png", PNG).unwrap_err();
        assert!(matches!(err, ContentError::Validation(_)));

        let lib = MediaLibrary::new(&github, &cfg, 1024);
        assert!(lib.validate_upload("image/png", PNG).is_ok());

        // Declared type not in the allow-list.
        let err = lib.validate_upload("application/pdf", PNG).unwrap_err();
        assert!(matches!(err, ContentError::Validation(_)));

        // Declared png, bytes say otherwise.
        let err = lib.validate_upload("image/png", b"GIF89a....").unwrap_err();
        assert!(matches!(err, ContentError::Validation(_)));
    }
}
