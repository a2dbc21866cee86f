pub mod sqlite;
pub mod traits;

pub use sqlite::{
    SqliteFeedFollowRepository, SqliteFeedRepository, SqlitePostRepository, SqliteStorage,
    SqliteUserRepository,
};
pub use traits::{FeedFollowRepository, FeedRepository, PostRepository, UserRepository};
