//! Articles: long-form documents with a publish lifecycle.
//!
//! Each article lives at `{articles_dir}/{slug}.md` in the backing
//! repository, a markdown body under YAML frontmatter in the gray-matter
//! convention. Drafts and published articles share the same file; the
//! `status` field and the publish/unpublish operations move between them.

mod handler;
mod lib;
mod routes;

pub use lib::*;
pub use routes::routes;
