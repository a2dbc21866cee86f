use crate::domain::{Feed, FeedFollowWithNames, FeedWithUser, User};
use crate::errors::{GatorError, GatorResult};
use crate::sources::validate_feed_url;
use crate::storage::traits::{FeedFollowRepository, FeedRepository};

pub struct FeedService<R: FeedRepository, FF: FeedFollowRepository> {
    repository: R,
    follows: FF,
}

impl<R: FeedRepository, FF: FeedFollowRepository> FeedService<R, FF> {
    pub fn new(repository: R, follows: FF) -> Self {
        Self {
            repository,
            follows,
        }
    }

    /// Add a new feed and follow it as `user`
    pub fn add(&self, user: &User, name: &str, url: &str) -> GatorResult<(Feed, FeedFollowWithNames)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatorError::InvalidInput("feed name is empty".to_string()));
        }
        validate_feed_url(url)?;

        let feed = self.repository.create(name, url, user.id)?;
        let follow = self.follows.create(user.id, feed.id)?;

        Ok((feed, follow))
    }

    /// List all feeds with the name of the user who added them
    pub fn list(&self) -> GatorResult<Vec<FeedWithUser>> {
        self.repository.get_all_with_user()
    }

    /// Follow an existing feed by URL
    pub fn follow(&self, user: &User, url: &str) -> GatorResult<FeedFollowWithNames> {
        let feed = self
            .repository
            .get_by_url(url)?
            .ok_or_else(|| GatorError::FeedNotFound(url.to_string()))?;

        match self.follows.create(user.id, feed.id) {
            Err(GatorError::AlreadyFollowing(_)) => Err(GatorError::AlreadyFollowing(url.to_string())),
            other => other,
        }
    }

    pub fn following(&self, user: &User) -> GatorResult<Vec<FeedFollowWithNames>> {
        self.follows.get_for_user(user.id)
    }

    pub fn unfollow(&self, user: &User, url: &str) -> GatorResult<()> {
        if self.follows.delete(user.id, url)? {
            Ok(())
        } else {
            Err(GatorError::FeedNotFound(format!("not following {url}")))
        }
    }
}
