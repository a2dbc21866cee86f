mod connection;
mod feed_follow_repository;
mod feed_repository;
mod post_repository;
mod user_repository;

pub use connection::SqliteStorage;
pub use feed_follow_repository::SqliteFeedFollowRepository;
pub use feed_repository::SqliteFeedRepository;
pub use post_repository::SqlitePostRepository;
pub use user_repository::SqliteUserRepository;

pub(crate) use connection::{is_unique_violation, parse_id, parse_time, parse_time_opt, time_to_sql};
