use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::config::Github;
use crate::error::GithubError;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("redaktion/", env!("CARGO_PKG_VERSION"));

/// A file fetched from the repository: decoded content plus the blob sha
/// that updates and deletes have to send back.
#[derive(Debug)]
pub struct RemoteFile {
    pub bytes: Vec<u8>,
    pub sha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    #[serde(rename = "type")]
    entry_type: String,
    sha: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Dir(Vec<DirEntry>),
    File(ContentFile),
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    content: WrittenBlob,
}

#[derive(Debug, Deserialize)]
struct WrittenBlob {
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteBody<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
}

/// Thin typed wrapper around the GitHub REST contents API. All repository
/// reads and writes in the service go through here.
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
    branch: String,
    token: String,
}

impl GithubClient {
    pub fn new(cfg: &Github) -> Result<Self, GithubError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            owner: cfg.owner.clone(),
            repo: cfg.repo.clone(),
            branch: cfg.branch.clone(),
            token: cfg.token.clone(),
        })
    }

    fn contents_url(&self, path: &str) -> String {
        let encoded = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, self.owner, self.repo, encoded
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Verifies the token can see the repository. Called once at startup.
    pub async fn ping(&self) -> Result<(), GithubError> {
        let url = format!("{}/repos/{}/{}", self.api_base, self.owner, self.repo);
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response, "").await)
        }
    }

    pub async fn get_file(&self, path: &str) -> Result<RemoteFile, GithubError> {
        let url = self.contents_url(path);
        let response = self
            .request(reqwest::Method::GET, &url)
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, path).await);
        }

        match response.json::<ContentsResponse>().await? {
            ContentsResponse::File(file) if file.entry_type == "file" => {
                let encoded = file.content.unwrap_or_default();
                let bytes = decode_content(&encoded)?;
                Ok(RemoteFile {
                    bytes,
                    sha: file.sha,
                })
            }
            _ => Err(GithubError::NotAFile(path.to_string())),
        }
    }

    pub async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, GithubError> {
        let url = self.contents_url(path);
        let response = self
            .request(reqwest::Method::GET, &url)
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, path).await);
        }

        match response.json::<ContentsResponse>().await? {
            ContentsResponse::Dir(entries) => Ok(entries),
            ContentsResponse::File(_) => Err(GithubError::NotAFile(path.to_string())),
        }
    }

    /// Creates the file when `sha` is `None`, updates it otherwise. Returns
    /// the new blob sha. GitHub rejects a create against an existing path
    /// and an update against a stale sha; both surface as `ShaConflict`.
    pub async fn put_file(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        sha: Option<&str>,
    ) -> Result<String, GithubError> {
        let url = self.contents_url(path);
        let body = PutBody {
            message,
            content: BASE64.encode(bytes),
            branch: &self.branch,
            sha,
        };
        let response = self
            .request(reqwest::Method::PUT, &url)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, path).await);
        }

        let written = response.json::<WriteResponse>().await?;
        Ok(written.content.sha)
    }

    pub async fn delete_file(
        &self,
        path: &str,
        message: &str,
        sha: &str,
    ) -> Result<(), GithubError> {
        let url = self.contents_url(path);
        let body = DeleteBody {
            message,
            sha,
            branch: &self.branch,
        };
        let response = self
            .request(reqwest::Method::DELETE, &url)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, path).await);
        }
        Ok(())
    }

    async fn error_from(response: reqwest::Response, path: &str) -> GithubError {
        let status = response.status().as_u16();
        let rate_exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "0")
            .unwrap_or(false);
        let body = response.text().await.unwrap_or_default();
        classify_status(status, rate_exhausted, path, &body)
    }
}

fn classify_status(status: u16, rate_exhausted: bool, path: &str, body: &str) -> GithubError {
    match status {
        401 => GithubError::Unauthorized,
        403 if rate_exhausted => GithubError::RateLimited,
        403 => GithubError::Unauthorized,
        404 => GithubError::NotFound(path.to_string()),
        409 | 422 => GithubError::ShaConflict(path.to_string()),
        _ => GithubError::UnexpectedStatus(status, body.chars().take(200).collect()),
    }
}

/// The contents API returns base64 with embedded newlines.
fn decode_content(encoded: &str) -> Result<Vec<u8>, GithubError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(BASE64.decode(compact)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GithubClient {
        GithubClient::new(&Github {
            token: "ghp_test".to_string(),
            owner: "acme".to_string(),
            repo: "site".to_string(),
            branch: "main".to_string(),
            articles_dir: "content/articles".to_string(),
            posts_dir: "content/posts".to_string(),
            media_dir: "content/media".to_string(),
            api_base: "https://api.github.com".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn encodes_path_segments_but_keeps_slashes() {
        let url = client().contents_url("content/media/summer shot.png");
        assert_eq!(
            url,
            "https://api.github.com/repos/acme/site/contents/content/media/summer%20shot.png"
        );
    }

    #[test]
    fn decodes_base64_with_embedded_newlines() {
        let encoded = "aGVsbG8g\nd29ybGQ=\n";
        assert_eq!(decode_content(encoded).unwrap(), b"hello world");
    }

    #[test]
    fn classifies_statuses() {
        assert!(matches!(
            classify_status(401, false, "p", ""),
            GithubError::Unauthorized
        ));
        assert!(matches!(
            classify_status(403, true, "p", ""),
            GithubError::RateLimited
        ));
        assert!(matches!(
            classify_status(403, false, "p", ""),
            GithubError::Unauthorized
        ));
        assert!(matches!(
            classify_status(404, false, "p", ""),
            GithubError::NotFound(_)
        ));
        assert!(matches!(
            classify_status(422, false, "p", ""),
            GithubError::ShaConflict(_)
        ));
        assert!(matches!(
            classify_status(500, false, "p", "boom"),
            GithubError::UnexpectedStatus(500, _)
        ));
    }

    #[test]
    fn put_body_omits_sha_on_create() {
        let body = PutBody {
            message: "m",
            content: "YQ==".to_string(),
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
    }
}
