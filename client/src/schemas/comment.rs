//! Comment schemas.

use serde::{Deserialize, Serialize};
use serde_json::json;
use storefront_remote::{JsonSchema, ObjectShape, Shape};

/// Author of a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentUser {
    /// User id
    pub id: u64,
    /// Username
    pub username: String,
    /// Display name
    pub full_name: String,
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment id
    pub id: u64,
    /// Text
    pub body: String,
    /// Post commented on
    pub post_id: u64,
    /// Like count
    pub likes: u64,
    /// Author
    pub user: CommentUser,
}

impl Comment {
    fn shape() -> ObjectShape {
        Shape::object()
            .field("id", Shape::number().integer())
            .field("body", Shape::string())
            .field("postId", Shape::number().integer())
            .field("likes", Shape::number().integer())
            .field(
                "user",
                Shape::object()
                    .field("id", Shape::number().integer())
                    .field("username", Shape::string())
                    .field("fullName", Shape::string()),
            )
    }
}

/// Comments of one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentsPage {
    /// Comments
    pub comments: Vec<Comment>,
    /// Total comments
    pub total: u32,
    /// Offset
    pub skip: u32,
    /// Page size
    pub limit: u32,
}

impl CommentsPage {
    /// Schema of `/comments/post/{id}` responses.
    #[must_use]
    pub fn schema() -> JsonSchema<Self> {
        JsonSchema::new(
            Shape::object()
                .field("comments", Shape::array(Comment::shape()))
                .field("total", Shape::number().integer())
                .field("skip", Shape::number().integer())
                .field("limit", Shape::number().integer()),
        )
    }
}

/// Body of `POST /comments/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    /// Text
    pub body: String,
    /// Post to comment on
    pub post_id: u64,
    /// Author id
    pub user_id: u64,
}

/// Author of a freshly created comment; the server may omit the display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCommentUser {
    /// User id
    pub id: u64,
    /// Username
    pub username: String,
    /// Display name
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Response of `POST /comments/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedComment {
    /// Assigned id
    pub id: u64,
    /// Text
    pub body: String,
    /// Post commented on
    pub post_id: u64,
    /// Like count, 0 when the server omits it
    pub likes: u64,
    /// Author
    pub user: CreatedCommentUser,
}

impl CreatedComment {
    /// Schema of the creation response.
    #[must_use]
    pub fn schema() -> JsonSchema<Self> {
        JsonSchema::new(
            Shape::object()
                .field("id", Shape::number().integer())
                .field("body", Shape::string())
                .field("postId", Shape::number().integer())
                .with_default("likes", Shape::number().integer(), json!(0))
                .field(
                    "user",
                    Shape::object()
                        .field("id", Shape::number().integer())
                        .field("username", Shape::string())
                        .optional("fullName", Shape::string()),
                ),
        )
    }
}
