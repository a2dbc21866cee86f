pub mod rss_atom;
pub mod traits;

pub use rss_atom::{parse_document, validate_feed_url, HttpFeedFetcher};
pub use traits::{FeedDocument, FeedFetcher, FeedItem};
