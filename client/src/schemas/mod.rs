//! DummyJSON document schemas.
//!
//! Every type here is deserialized only after its `schema()` accepted the
//! raw document, so violations name the offending field instead of surfacing
//! as a serde error.

mod auth;
mod comment;
mod post;
pub(crate) mod product;
pub(crate) mod user;

pub use auth::{LoginRequest, LoginResponse};
pub use comment::{Comment, CommentUser, CommentsPage, CreatedComment, CreatedCommentUser, NewComment};
pub use post::{CreatedPost, NewPost, Post, PostDetail, PostsPage, Reactions, ReactedPost, ReactionsUpdate};
pub use product::{Dimensions, Product, ProductMeta, ProductsPage, Review};
pub use user::{Address, Bank, Company, Coordinates, Hair, UserDetail, UserSummary};
