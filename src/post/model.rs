//! Post entity and its wire form.

use serde::{Deserialize, Serialize};

/// Id value meaning "not assigned yet".
pub const UNASSIGNED: i64 = 0;

/// A stored post.
///
/// `removed` marks a soft-deleted record: still in the map, invisible to
/// every read path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub removed: bool,
}

impl Post {
    /// A post that has not been saved yet.
    pub fn new(content: impl Into<String>) -> Self {
        Self { id: UNASSIGNED, content: content.into(), removed: false }
    }

    pub fn with_id(id: i64, content: impl Into<String>) -> Self {
        Self { id, content: content.into(), removed: false }
    }

    pub fn is_new(&self) -> bool {
        self.id == UNASSIGNED
    }
}

/// JSON body of requests and responses: `{"id": 1, "content": "hi"}`.
///
/// A missing `id` deserialises to `0`, i.e. a create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDto {
    #[serde(default)]
    pub id: i64,
    pub content: String,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self { id: post.id, content: post.content }
    }
}

impl From<PostDto> for Post {
    fn from(dto: PostDto) -> Self {
        Self::with_id(dto.id, dto.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dto_serializes_only_id_and_content() {
        let dto = PostDto::from(Post { id: 3, content: "hi".into(), removed: true });
        assert_eq!(serde_json::to_string(&dto).unwrap(), r#"{"id":3,"content":"hi"}"#);
    }

    #[test]
    fn missing_id_means_new() {
        let dto: PostDto = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert!(Post::from(dto).is_new());
    }

    #[test]
    fn missing_content_is_rejected() {
        assert!(serde_json::from_str::<PostDto>(r#"{"id":1}"#).is_err());
    }
}
