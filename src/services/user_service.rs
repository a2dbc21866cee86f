use crate::domain::User;
use crate::errors::{GatorError, GatorResult};
use crate::storage::traits::UserRepository;

pub struct UserService<R: UserRepository> {
    repository: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Create a user with a unique, non-blank name
    pub fn register(&self, name: &str) -> GatorResult<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatorError::InvalidInput("user name is empty".to_string()));
        }

        self.repository.create(name)
    }

    /// Look up an existing user to switch to
    pub fn login(&self, name: &str) -> GatorResult<User> {
        self.current(name)
    }

    /// Resolve the user named in the config file
    pub fn current(&self, name: &str) -> GatorResult<User> {
        self.repository
            .get_by_name(name)?
            .ok_or_else(|| GatorError::UserNotFound(name.to_string()))
    }

    pub fn list(&self) -> GatorResult<Vec<User>> {
        self.repository.get_all()
    }

    /// Delete all users along with everything they own
    pub fn reset(&self) -> GatorResult<usize> {
        self.repository.delete_all()
    }
}
