pub mod feed_service;
pub mod ingest_service;
pub mod post_service;
pub mod scheduler;
pub mod user_service;

pub use feed_service::FeedService;
pub use ingest_service::{IngestReport, IngestService};
pub use post_service::PostService;
pub use scheduler::{parse_interval, Scheduler};
pub use user_service::UserService;
