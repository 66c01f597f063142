//! Posts: short notes without a publish lifecycle, live once written.
//! Stored at `{posts_dir}/{slug}.md` with the hand-rolled frontmatter
//! subset rather than full YAML.

mod handler;
mod lib;
mod routes;

pub use lib::*;
pub use routes::routes;
