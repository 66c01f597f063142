use serde::{Deserialize, Serialize};

use crate::error::{ContentError, GithubError};
use crate::frontmatter;
use crate::github::GithubClient;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
}

impl Default for ArticleStatus {
    fn default() -> Self {
        ArticleStatus::Draft
    }
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }
}

/// The YAML frontmatter of an article, gray-matter convention. Optional
/// fields are omitted on write so a parse of the generated document gives
/// back exactly this struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Article {
    pub slug: String,
    pub sha: String,
    #[serde(flatten)]
    pub meta: ArticleMeta,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct ArticleSummary {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub status: ArticleStatus,
    pub created_at: String,
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateArticle {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub body: String,
}

/// Partial update. `sha` is the blob sha the editor last saw; GitHub rejects
/// the write when the file moved on underneath, which comes back as 409.
#[derive(Debug, Deserialize)]
pub struct UpdateArticle {
    pub sha: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub cover_image: Option<String>,
    pub body: Option<String>,
}

fn validate_meta(title: &str, tags: &[String], cover_image: Option<&str>) -> Result<(), ContentError> {
    let mut errors = Vec::new();
    validate::validate_title(title, &mut errors);
    validate::validate_tags(tags, &mut errors);
    if let Some(url) = cover_image {
        validate::validate_cover_image(url, &mut errors);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ContentError::Validation(errors))
    }
}

pub fn generate_document(meta: &ArticleMeta, body: &str) -> Result<String, ContentError> {
    let yaml = serde_yaml::to_string(meta).map_err(frontmatter::FrontmatterError::Yaml)?;
    Ok(frontmatter::join(&yaml, body))
}

pub fn parse_document(slug: &str, sha: &str, text: &str) -> Result<Article, ContentError> {
    let doc = frontmatter::split(text)?;
    let meta = match &doc.matter {
        Some(yaml) => {
            serde_yaml::from_str::<ArticleMeta>(yaml).map_err(frontmatter::FrontmatterError::Yaml)?
        }
        None => ArticleMeta::default(),
    };
    Ok(Article {
        slug: slug.to_string(),
        sha: sha.to_string(),
        meta,
        body: doc.body,
    })
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

pub struct Articles<'a> {
    github: &'a GithubClient,
    dir: &'a str,
}

impl<'a> Articles<'a> {
    pub fn new(github: &'a GithubClient, dir: &'a str) -> Self {
        Self { github, dir }
    }

    fn doc_path(&self, slug: &str) -> String {
        format!("{}/{}.md", self.dir, slug)
    }

    pub async fn list(&self) -> Result<Vec<ArticleSummary>, ContentError> {
        let entries = match self.github.list_dir(self.dir).await {
            Ok(entries) => entries,
            // An empty library is a repo that has no articles directory yet.
            Err(GithubError::NotFound(_)) => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();
        for entry in entries {
            if entry.entry_type != "file" || !entry.name.ends_with(".md") {
                continue;
            }
            let slug = entry.name.trim_end_matches(".md").to_string();
            let file = self.github.get_file(&entry.path).await?;
            let text = String::from_utf8_lossy(&file.bytes).into_owned();
            match parse_document(&slug, &file.sha, &text) {
                Ok(article) => summaries.push(ArticleSummary {
                    slug: article.slug,
                    title: article.meta.title,
                    description: article.meta.description,
                    tags: article.meta.tags,
                    status: article.meta.status,
                    created_at: article.meta.created_at,
                    published_at: article.meta.published_at,
                }),
                Err(e) => {
                    tracing::warn!("skipping article '{}' with bad frontmatter: {}", slug, e);
                }
            }
        }
        Ok(summaries)
    }

    pub async fn get(&self, slug: &str) -> Result<Article, ContentError> {
        // Update, delete and set_status all come through here, so this
        // also keeps path-traversal slugs away from doc_path.
        if !validate::is_valid_slug(slug) {
            return Err(ContentError::NotFound(format!("article '{}'", slug)));
        }
        let path = self.doc_path(slug);
        let file = match self.github.get_file(&path).await {
            Ok(file) => file,
            Err(GithubError::NotFound(_)) => {
                return Err(ContentError::NotFound(format!("article '{}'", slug)));
            }
            Err(e) => return Err(e.into()),
        };
        let text = String::from_utf8_lossy(&file.bytes).into_owned();
        parse_document(slug, &file.sha, &text)
    }

    pub async fn create(&self, input: CreateArticle) -> Result<Article, ContentError> {
        validate_meta(&input.title, &input.tags, input.cover_image.as_deref())?;

        let slug = validate::slugify(&input.title);
        if slug.is_empty() {
            return Err(ContentError::Validation(vec![
                "title: produces an empty slug".to_string(),
            ]));
        }

        match self.get(&slug).await {
            Ok(_) => return Err(ContentError::SlugTaken(slug)),
            Err(ContentError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let meta = ArticleMeta {
            title: input.title.trim().to_string(),
            description: input.description,
            tags: input.tags,
            cover_image: input.cover_image,
            status: ArticleStatus::Draft,
            created_at: today(),
            published_at: None,
        };
        let text = generate_document(&meta, &input.body)?;
        let message = format!("redaktion: create article {}", slug);
        let sha = match self
            .github
            .put_file(&self.doc_path(&slug), text.as_bytes(), &message, None)
            .await
        {
            Ok(sha) => sha,
            // Lost the race against another create of the same slug.
            Err(GithubError::ShaConflict(_)) => return Err(ContentError::SlugTaken(slug)),
            Err(e) => return Err(e.into()),
        };

        Ok(Article {
            slug,
            sha,
            meta,
            body: input.body,
        })
    }

    pub async fn update(&self, slug: &str, input: UpdateArticle) -> Result<Article, ContentError> {
        let current = self.get(slug).await?;

        let mut meta = current.meta;
        if let Some(title) = input.title {
            meta.title = title.trim().to_string();
        }
        if let Some(description) = input.description {
            meta.description = Some(description);
        }
        if let Some(tags) = input.tags {
            meta.tags = tags;
        }
        if let Some(cover_image) = input.cover_image {
            meta.cover_image = Some(cover_image);
        }
        let body = input.body.unwrap_or(current.body);

        validate_meta(&meta.title, &meta.tags, meta.cover_image.as_deref())?;

        let text = generate_document(&meta, &body)?;
        let message = format!("redaktion: update article {}", slug);
        let sha = self
            .github
            .put_file(
                &self.doc_path(slug),
                text.as_bytes(),
                &message,
                Some(&input.sha),
            )
            .await?;

        Ok(Article {
            slug: slug.to_string(),
            sha,
            meta,
            body,
        })
    }

    pub async fn set_status(&self, slug: &str, status: ArticleStatus) -> Result<Article, ContentError> {
        let current = self.get(slug).await?;

        let mut meta = current.meta;
        meta.status = status;
        meta.published_at = match status {
            ArticleStatus::Published => Some(today()),
            ArticleStatus::Draft => None,
        };

        let text = generate_document(&meta, &current.body)?;
        let message = format!("redaktion: {} article {}", status.as_str(), slug);
        let sha = self
            .github
            .put_file(
                &self.doc_path(slug),
                text.as_bytes(),
                &message,
                Some(&current.sha),
            )
            .await?;

        Ok(Article {
            slug: slug.to_string(),
            sha,
            meta,
            body: current.body,
        })
    }

    pub async fn delete(&self, slug: &str) -> Result<(), ContentError> {
        let current = self.get(slug).await?;
        let message = format!("redaktion: delete article {}", slug);
        self.github
            .delete_file(&self.doc_path(slug), &message, &current.sha)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> ArticleMeta {
        ArticleMeta {
            title: "Shipping the editor".to_string(),
            description: Some("Notes from the first release".to_string()),
            tags: vec!["release".to_string(), "editor".to_string()],
            cover_image: Some("https://cdn.example.com/cover.png".to_string()),
            status: ArticleStatus::Draft,
            created_at: "2026-08-24".to_string(),
            published_at: None,
        }
    }

    #[test]
    fn document_round_trips_meta_and_body() {
        let body = "# Shipping\n\nIt works.\n";
        let text = generate_document(&meta(), body).unwrap();
        let article = parse_document("shipping-the-editor", "abc123", &text).unwrap();
        assert_eq!(article.meta, meta());
        assert_eq!(article.body, body);
        assert_eq!(article.sha, "abc123");
    }

    #[test]
    fn optional_fields_absent_after_round_trip() {
        let mut m = meta();
        m.description = None;
        m.cover_image = None;
        m.tags = vec![];
        let text = generate_document(&m, "").unwrap();
        assert!(!text.contains("description"));
        assert!(!text.contains("cover_image"));
        assert!(!text.contains("tags"));
        let article = parse_document("x", "s", &text).unwrap();
        assert_eq!(article.meta, m);
    }

    #[test]
    fn document_without_fence_is_empty_meta_full_body() {
        let article = parse_document("x", "s", "plain markdown, no fence\n").unwrap();
        assert_eq!(article.meta, ArticleMeta::default());
        assert_eq!(article.body, "plain markdown, no fence\n");
    }

    #[test]
    fn status_serializes_lowercase() {
        let yaml = serde_yaml::to_string(&ArticleStatus::Published).unwrap();
        assert_eq!(yaml.trim(), "published");
    }

    #[tokio::test]
    async fn traversal_slugs_are_not_found_without_a_request() {
        let cfg = crate::config::Github {
            token: "t".to_string(),
            owner: "acme".to_string(),
            repo: "site".to_string(),
            branch: "main".to_string(),
            articles_dir: "content/articles".to_string(),
            posts_dir: "content/posts".to_string(),
            media_dir: "content/media".to_string(),
            // Unroutable, so a request slipping through would error
            // differently than NotFound.
            api_base: "http://192.0.2.1".to_string(),
        };
        let github = GithubClient::new(&cfg).unwrap();
        let store = Articles::new(&github, &cfg.articles_dir);

        for slug in ["../../etc/passwd", "a/b", "Upper", ""] {
            let err = store.get(slug).await.unwrap_err();
            assert!(matches!(err, ContentError::NotFound(_)), "slug {:?}", slug);
        }
    }
}
