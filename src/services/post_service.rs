use crate::domain::{PostWithFeed, User};
use crate::errors::{GatorError, GatorResult};
use crate::storage::traits::PostRepository;

pub const DEFAULT_BROWSE_LIMIT: usize = 2;

pub struct PostService<P: PostRepository> {
    repository: P,
}

impl<P: PostRepository> PostService<P> {
    pub fn new(repository: P) -> Self {
        Self { repository }
    }

    /// Newest posts from the feeds `user` follows
    pub fn browse(&self, user: &User, limit: usize) -> GatorResult<Vec<PostWithFeed>> {
        if limit == 0 {
            return Err(GatorError::InvalidInput("limit must be at least 1".to_string()));
        }
        self.repository.get_for_user(user.id, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::storage::traits::MockPostRepository;
    use mockall::predicate::eq;

    #[test]
    fn test_browse_passes_limit() {
        let user = User::new("kahya".to_string());
        let mut repo = MockPostRepository::new();
        repo.expect_get_for_user()
            .with(eq(user.id), eq(5))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let posts = PostService::new(repo).browse(&user, 5).unwrap();
        assert!(posts.is_empty());
    }

    #[test]
    fn test_browse_zero_limit() {
        let user = User::new("kahya".to_string());
        let mut repo = MockPostRepository::new();
        repo.expect_get_for_user().times(0);

        assert!(matches!(
            PostService::new(repo).browse(&user, 0),
            Err(GatorError::InvalidInput(_))
        ));
    }
}
