//! Media library: image uploads stored under `{media_dir}/` in the backing
//! repository, keyed by a content-hash prefix for dedup.

mod handler;
mod lib;
mod routes;

pub use lib::*;
pub use routes::routes;
