//! Domain entities - the core content model.

mod author;
mod comment;
mod post;

pub use author::Author;
pub use comment::Comment;
pub use post::{Post, PostStatus};
