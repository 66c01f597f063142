use serde::{Deserialize, Serialize};

use crate::error::{ContentError, GithubError};
use crate::frontmatter::{self, FrontmatterError, SimpleValue};
use crate::github::GithubClient;
use crate::validate;

/// Post frontmatter, written and read by the hand-rolled subset parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostMeta {
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
}

impl PostMeta {
    fn to_fields(&self) -> Vec<(String, SimpleValue)> {
        vec![
            ("title".to_string(), SimpleValue::Str(self.title.clone())),
            ("date".to_string(), SimpleValue::Str(self.date.clone())),
            ("tags".to_string(), SimpleValue::List(self.tags.clone())),
        ]
    }

    fn from_fields(fields: Vec<(String, SimpleValue)>) -> Result<Self, FrontmatterError> {
        let mut meta = PostMeta::default();
        for (key, value) in fields {
            match key.as_str() {
                "title" => {
                    meta.title = value.as_str().unwrap_or_default().to_string();
                }
                "date" => {
                    // Dates are quoted strings in documents we wrote, but
                    // hand-edited files may carry a bare scalar.
                    meta.date = match value {
                        SimpleValue::Str(s) => s,
                        SimpleValue::Int(n) => n.to_string(),
                        _ => String::new(),
                    };
                }
                "tags" => {
                    meta.tags = value.as_list().unwrap_or_default().to_vec();
                }
                _ => {}
            }
        }
        Ok(meta)
    }
}

#[derive(Debug, Serialize)]
pub struct Post {
    pub slug: String,
    pub sha: String,
    #[serde(flatten)]
    pub meta: PostMeta,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePost {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePost {
    pub sha: String,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub body: Option<String>,
}

fn validate_meta(title: &str, tags: &[String]) -> Result<(), ContentError> {
    let mut errors = Vec::new();
    validate::validate_title(title, &mut errors);
    validate::validate_tags(tags, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ContentError::Validation(errors))
    }
}

pub fn generate_document(meta: &PostMeta, body: &str) -> String {
    frontmatter::generate_simple(&meta.to_fields(), body)
}

pub fn parse_document(slug: &str, sha: &str, text: &str) -> Result<Post, ContentError> {
    let (fields, body) = frontmatter::parse_simple(text)?;
    let meta = PostMeta::from_fields(fields)?;
    Ok(Post {
        slug: slug.to_string(),
        sha: sha.to_string(),
        meta,
        body,
    })
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

pub struct Posts<'a> {
    github: &'a GithubClient,
    dir: &'a str,
}

impl<'a> Posts<'a> {
    pub fn new(github: &'a GithubClient, dir: &'a str) -> Self {
        Self { github, dir }
    }

    fn doc_path(&self, slug: &str) -> String {
        format!("{}/{}.md", self.dir, slug)
    }

    pub async fn list(&self) -> Result<Vec<PostSummary>, ContentError> {
        let entries = match self.github.list_dir(self.dir).await {
            Ok(entries) => entries,
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
                Ok(post) => summaries.push(PostSummary {
                    slug: post.slug,
                    title: post.meta.title,
                    date: post.meta.date,
                    tags: post.meta.tags,
                }),
                Err(e) => {
                    tracing::warn!("skipping post '{}' with bad frontmatter: {}", slug, e);
                }
            }
        }
        Ok(summaries)
    }

    pub async fn get(&self, slug: &str) -> Result<Post, ContentError> {
        // Update and delete both come through here, so this also keeps
        // path-traversal slugs away from doc_path.
        if !validate::is_valid_slug(slug) {
            return Err(ContentError::NotFound(format!("post '{}'", slug)));
        }
        let path = self.doc_path(slug);
        let file = match self.github.get_file(&path).await {
            Ok(file) => file,
            Err(GithubError::NotFound(_)) => {
                return Err(ContentError::NotFound(format!("post '{}'", slug)));
            }
            Err(e) => return Err(e.into()),
        };
        let text = String::from_utf8_lossy(&file.bytes).into_owned();
        parse_document(slug, &file.sha, &text)
    }

    pub async fn create(&self, input: CreatePost) -> Result<Post, ContentError> {
        validate_meta(&input.title, &input.tags)?;

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

        let meta = PostMeta {
            title: input.title.trim().to_string(),
            date: today(),
            tags: input.tags,
        };
        let text = generate_document(&meta, &input.body);
        let message = format!("redaktion: create post {}", slug);
        let sha = match self
            .github
            .put_file(&self.doc_path(&slug), text.as_bytes(), &message, None)
            .await
        {
            Ok(sha) => sha,
            Err(GithubError::ShaConflict(_)) => return Err(ContentError::SlugTaken(slug)),
            Err(e) => return Err(e.into()),
        };

        Ok(Post {
            slug,
            sha,
            meta,
            body: input.body,
        })
    }

    pub async fn update(&self, slug: &str, input: UpdatePost) -> Result<Post, ContentError> {
        let current = self.get(slug).await?;

        let mut meta = current.meta;
        if let Some(title) = input.title {
            meta.title = title.trim().to_string();
        }
        if let Some(tags) = input.tags {
            meta.tags = tags;
        }
        let body = input.body.unwrap_or(current.body);

        validate_meta(&meta.title, &meta.tags)?;

        let text = generate_document(&meta, &body);
        let message = format!("redaktion: update post {}", slug);
        let sha = self
            .github
            .put_file(
                &self.doc_path(slug),
                text.as_bytes(),
                &message,
                Some(&input.sha),
            )
            .await?;

        Ok(Post {
            slug: slug.to_string(),
            sha,
            meta,
            body,
        })
    }

    pub async fn delete(&self, slug: &str) -> Result<(), ContentError> {
        let current = self.get(slug).await?;
        let message = format!("redaktion: delete post {}", slug);
        self.github
            .delete_file(&self.doc_path(slug), &message, &current.sha)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> PostMeta {
        PostMeta {
            title: "Quick note: axum extractors".to_string(),
            date: "2026-08-24".to_string(),
            tags: vec!["rust".to_string(), "til".to_string()],
        }
    }

    #[test]
    fn document_round_trips_meta_and_body() {
        let body = "Extractors run in order.\n";
        let text = generate_document(&meta(), body);
        let post = parse_document("quick-note-axum-extractors", "sha1", &text).unwrap();
        assert_eq!(post.meta, meta());
        assert_eq!(post.body, body);
    }

    #[test]
    fn date_survives_as_string_not_number() {
        let m = meta();
        let text = generate_document(&m, "");
        // 2026-08-24 is not an i64, so it needs no quoting, but must still
        // come back as a string.
        let post = parse_document("x", "s", &text).unwrap();
        assert_eq!(post.meta.date, "2026-08-24");
    }

    #[test]
    fn empty_tags_round_trip() {
        let m = PostMeta {
            title: "No tags here".to_string(),
            date: "2026-01-01".to_string(),
            tags: vec![],
        };
        let text = generate_document(&m, "body\n");
        let post = parse_document("x", "s", &text).unwrap();
        assert_eq!(post.meta, m);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let text = "---\ntitle: hi\ndate: 2026-01-01\ntags: [a]\nlegacy_field: 3\n---\n\nbody\n";
        let post = parse_document("x", "s", text).unwrap();
        assert_eq!(post.meta.title, "hi");
        assert_eq!(post.meta.tags, vec!["a".to_string()]);
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
            api_base: "http://192.0.2.1".to_string(),
        };
        let github = GithubClient::new(&cfg).unwrap();
        let store = Posts::new(&github, &cfg.posts_dir);

        for slug in ["../../etc/passwd", "a/b", "Upper"] {
            let err = store.get(slug).await.unwrap_err();
            assert!(matches!(err, ContentError::NotFound(_)), "slug {:?}", slug);
        }
    }
}
