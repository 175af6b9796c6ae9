//! Content module - post records, front matter, discovery, search and listing

pub mod frontmatter;
pub mod listing;
pub mod loader;
mod post;
pub mod search;
pub mod slug;

pub use listing::PostPage;
pub use loader::ContentLoader;
pub use post::{NewPost, PostRecord, INDEX_TITLE};
pub use search::Query;
