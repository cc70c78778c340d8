//! Post schemas.

use serde::{Deserialize, Serialize};
use serde_json::json;
use storefront_remote::{JsonSchema, ObjectShape, Shape};

/// Reaction counters of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions {
    /// Likes
    pub likes: u64,
    /// Dislikes
    pub dislikes: u64,
}

impl Reactions {
    pub(crate) fn shape() -> ObjectShape {
        Shape::object()
            .field("likes", Shape::number().integer())
            .field("dislikes", Shape::number().integer())
    }
}

/// A post in the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Post id
    pub id: u64,
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
    /// Tags
    pub tags: Vec<String>,
    /// Reaction counters
    pub reactions: Reactions,
    /// View count
    pub views: u64,
    /// Author id
    pub user_id: u64,
}

/// Post detail document; the same shape as a feed post.
pub type PostDetail = Post;

impl Post {
    pub(crate) fn shape() -> ObjectShape {
        Shape::object()
            .field("id", Shape::number().integer())
            .field("title", Shape::string())
            .field("body", Shape::string())
            .field("tags", Shape::array(Shape::string()))
            .field("reactions", Reactions::shape())
            .field("views", Shape::number().integer())
            .field("userId", Shape::number().integer())
    }

    /// Schema of a single post document.
    #[must_use]
    pub fn schema() -> JsonSchema<Self> {
        JsonSchema::new(Self::shape())
    }
}

/// One page of posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostsPage {
    /// Posts on this page
    pub posts: Vec<Post>,
    /// Total matching posts
    pub total: u32,
    /// Offset of this page
    pub skip: u32,
    /// Requested page size
    pub limit: u32,
}

impl PostsPage {
    /// Schema of `/posts` and `/posts/search` responses.
    #[must_use]
    pub fn schema() -> JsonSchema<Self> {
        JsonSchema::new(
            Shape::object()
                .field("posts", Shape::array(Post::shape()))
                .field("total", Shape::number().integer())
                .field("skip", Shape::number().integer())
                .field("limit", Shape::number().integer()),
        )
    }
}

/// Body of `POST /posts/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
    /// Author id
    pub user_id: u64,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewPost {
    /// A post with no tags.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>, user_id: u64) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            user_id,
            tags: Vec::new(),
        }
    }

    /// Set the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Response of `POST /posts/add`.
///
/// The server echoes the submitted fields with an id; counters start at 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPost {
    /// Assigned id
    pub id: u64,
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
    /// Author id
    pub user_id: u64,
    /// Tags
    pub tags: Vec<String>,
}

impl CreatedPost {
    /// Schema of the creation response.
    #[must_use]
    pub fn schema() -> JsonSchema<Self> {
        JsonSchema::new(
            Shape::object()
                .field("id", Shape::number().integer())
                .field("title", Shape::string())
                .field("body", Shape::string())
                .field("userId", Shape::number().integer())
                .with_default("tags", Shape::array(Shape::string()), json!([])),
        )
    }

    /// The created post as it appears in the feed.
    #[must_use]
    pub fn into_post(self) -> Post {
        Post {
            id: self.id,
            title: self.title,
            body: self.body,
            tags: self.tags,
            reactions: Reactions::default(),
            views: 0,
            user_id: self.user_id,
        }
    }
}

/// Body of `PUT /posts/{id}` for a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionsUpdate {
    /// New counters
    pub reactions: Reactions,
}

/// The part of a `PUT /posts/{id}` response a like toggle reads back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactedPost {
    /// Post id
    pub id: u64,
    /// Stored counters
    pub reactions: Reactions,
}

impl ReactedPost {
    /// Schema of the update response.
    #[must_use]
    pub fn schema() -> JsonSchema<Self> {
        JsonSchema::new(
            Shape::object()
                .field("id", Shape::number().integer())
                .field("reactions", Reactions::shape()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_remote::Schema;

    fn post_json(id: u64) -> serde_json::Value {
        json!({
            "id": id,
            "title": "His mother had always taught him",
            "body": "His mother had always taught him not to ever think of himself as better than others.",
            "tags": ["history", "american", "crime"],
            "reactions": {"likes": 192, "dislikes": 25},
            "views": 305,
            "userId": 121
        })
    }

    #[test]
    fn test_posts_page_accepts_dummyjson_document() {
        let page = PostsPage::schema()
            .validate(&json!({"posts": [post_json(1), post_json(2)], "total": 251, "skip": 0, "limit": 20}))
            .unwrap();
        assert_eq!(page.posts.len(), 2);
        assert_eq!(page.posts[0].user_id, 121);
        assert_eq!(page.posts[1].reactions.likes, 192);
        assert_eq!(page.total, 251);
    }

    #[test]
    fn test_nested_violation_names_the_post() {
        let mut broken = post_json(2);
        broken["reactions"] = json!({"likes": 1});
        let violations = PostsPage::schema()
            .validate(&json!({"posts": [post_json(1), broken], "total": 2, "skip": 0, "limit": 20}))
            .unwrap_err();
        assert_eq!(
            violations.first().unwrap().path.to_string(),
            "posts[1].reactions.dislikes"
        );
    }

    #[test]
    fn test_created_post_defaults_tags() {
        let created = CreatedPost::schema()
            .validate(&json!({"id": 252, "title": "Hi", "body": "First", "userId": 5}))
            .unwrap();
        assert!(created.tags.is_empty());

        let post = created.into_post();
        assert_eq!(post.id, 252);
        assert_eq!(post.reactions, Reactions::default());
    }
}
