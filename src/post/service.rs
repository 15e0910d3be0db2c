//! Business rules on top of the repository.
//!
//! The one rule that matters: a non-zero id is an update, and an update of a
//! post that is not live is rejected instead of turning into an insert.

use std::sync::Arc;

use super::model::{Post, PostDto};
use super::repository::PostRepository;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostError {
    #[error("post {0} not found")]
    NotFound(i64),
}

/// Outcome of [`PostService::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Saved {
    Created(PostDto),
    Updated(PostDto),
}

impl Saved {
    pub fn post(&self) -> &PostDto {
        match self {
            Self::Created(p) | Self::Updated(p) => p,
        }
    }

    pub fn into_post(self) -> PostDto {
        match self {
            Self::Created(p) | Self::Updated(p) => p,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostService {
    repository: Arc<PostRepository>,
}

impl PostService {
    pub fn new(repository: Arc<PostRepository>) -> Self {
        Self { repository }
    }

    pub fn all(&self) -> Vec<PostDto> {
        self.repository.all().into_iter().map(PostDto::from).collect()
    }

    pub fn get_by_id(&self, id: i64) -> Result<PostDto, PostError> {
        self.repository.get_by_id(id)
            .map(PostDto::from)
            .ok_or(PostError::NotFound(id))
    }

    /// Creates when `id == 0`, otherwise updates the live post with that id.
    pub fn save(&self, dto: PostDto) -> Result<Saved, PostError> {
        let post = Post::from(dto);
        if post.is_new() {
            return Ok(Saved::Created(self.repository.save(post).into()));
        }

        let id = post.id;
        self.repository.replace(post)
            .map(|p| Saved::Updated(p.into()))
            .ok_or(PostError::NotFound(id))
    }

    /// No-op when there is no live post with `id`.
    pub fn remove_by_id(&self, id: i64) {
        self.repository.remove_by_id(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::repository::DeletePolicy;

    fn service() -> PostService {
        PostService::new(Arc::new(PostRepository::new(DeletePolicy::Soft)))
    }

    fn dto(id: i64, content: &str) -> PostDto {
        PostDto { id, content: content.to_owned() }
    }

    #[test]
    fn zero_id_creates() {
        let svc = service();
        let saved = svc.save(dto(0, "hi")).unwrap();
        assert_eq!(saved, Saved::Created(dto(1, "hi")));
        assert_eq!(svc.get_by_id(1).unwrap(), dto(1, "hi"));
    }

    #[test]
    fn live_id_updates() {
        let svc = service();
        let id = svc.save(dto(0, "old")).unwrap().into_post().id;

        let saved = svc.save(dto(id, "new")).unwrap();
        assert_eq!(saved, Saved::Updated(dto(id, "new")));
        assert_eq!(svc.all(), vec![dto(id, "new")]);
    }

    #[test]
    fn unknown_id_update_is_not_found() {
        let svc = service();
        assert_eq!(svc.save(dto(5, "x")), Err(PostError::NotFound(5)));
        assert!(svc.all().is_empty());
    }

    #[test]
    fn removed_id_update_is_not_found() {
        let svc = service();
        let id = svc.save(dto(0, "x")).unwrap().post().id;
        svc.remove_by_id(id);

        assert_eq!(svc.save(dto(id, "y")), Err(PostError::NotFound(id)));
        assert_eq!(svc.get_by_id(id), Err(PostError::NotFound(id)));
    }

    #[test]
    fn get_by_id_zero_is_not_found() {
        assert_eq!(service().get_by_id(0), Err(PostError::NotFound(0)));
    }

    #[test]
    fn remove_absent_is_noop() {
        let svc = service();
        svc.remove_by_id(3);
        assert!(svc.all().is_empty());
    }
}
