use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::domain::{Feed, NewPost};
use crate::errors::GatorError;
use crate::sources::{FeedFetcher, FeedItem};
use crate::storage::traits::{FeedRepository, PostRepository};

/// RFC 1123 with a numeric zone, e.g. `Mon, 02 Jan 2006 15:04:05 -0700`.
pub const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Outcome of one ingestion step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub items: usize,
    pub new_posts: usize,
    pub duplicates: usize,
    pub failed: usize,
    /// Set when the step stopped before looking at any item.
    pub error: Option<String>,
}

pub struct IngestService<F: FeedRepository, P: PostRepository, X: FeedFetcher> {
    feed_repository: F,
    post_repository: P,
    fetcher: X,
}

impl<F: FeedRepository, P: PostRepository, X: FeedFetcher> IngestService<F, P, X> {
    pub fn new(feed_repository: F, post_repository: P, fetcher: X) -> Self {
        Self {
            feed_repository,
            post_repository,
            fetcher,
        }
    }

    /// Fetch one feed and store the items not seen before.
    ///
    /// The feed is marked fetched before the network call, so a feed that
    /// keeps failing still moves to the back of the staleness order. Nothing
    /// here is propagated: failures are logged and summarized in the report.
    pub fn ingest(&self, feed: &Feed) -> IngestReport {
        let mut report = IngestReport::default();

        if let Err(e) = self.feed_repository.mark_fetched(feed.id, crate::domain::now()) {
            error!("Couldn't mark feed {} fetched: {}", feed.name, e);
            report.error = Some(e.to_string());
            return report;
        }

        let document = match self.fetcher.fetch(&feed.url) {
            Ok(document) => document,
            Err(e) => {
                if e.is_fetch_failure() {
                    warn!("Couldn't collect feed {}: {}", feed.name, e);
                } else {
                    error!("Unexpected error collecting feed {}: {}", feed.name, e);
                }
                report.error = Some(e.to_string());
                return report;
            }
        };

        report.items = document.items.len();
        for item in document.items {
            let url = item.link.clone();
            match self.post_repository.create(&to_new_post(feed, item)) {
                Ok(_) => report.new_posts += 1,
                Err(GatorError::DuplicatePostUrl(_)) => {
                    debug!("Skipping already stored post {}", url);
                    report.duplicates += 1;
                }
                Err(e) => {
                    error!("Couldn't create post {} for feed {}: {}", url, feed.name, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Feed {} collected, {} posts found ({} new)",
            feed.name, report.items, report.new_posts
        );
        report
    }
}

fn to_new_post(feed: &Feed, item: FeedItem) -> NewPost {
    let published_at = item.pub_date.as_deref().and_then(parse_pub_date);

    NewPost::new(feed.id, item.title, item.link)
        .with_description(item.description)
        .with_published_at(published_at)
}

/// `None` for anything not in `PUB_DATE_FORMAT`.
pub fn parse_pub_date(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(text.trim(), PUB_DATE_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewPost;
    use crate::errors::GatorResult;
    use crate::sources::traits::MockFeedFetcher;
    use crate::sources::FeedDocument;
    use crate::storage::sqlite::{
        SqliteFeedRepository, SqlitePostRepository, SqliteStorage, SqliteUserRepository,
    };
    use crate::storage::traits::{MockFeedRepository, MockPostRepository, UserRepository};
    use chrono::{Duration, TimeZone};

    fn item(title: &str, link: &str, pub_date: Option<&str>) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            description: Some(format!("About {title}")),
            link: link.to_string(),
            pub_date: pub_date.map(str::to_string),
        }
    }

    fn document(items: Vec<FeedItem>) -> FeedDocument {
        FeedDocument {
            title: "Test Feed".to_string(),
            items,
        }
    }

    fn fetcher_returning(doc: FeedDocument) -> MockFeedFetcher {
        let mut fetcher = MockFeedFetcher::new();
        fetcher
            .expect_fetch()
            .returning(move |_| Ok(doc.clone()));
        fetcher
    }

    struct Fixture {
        storage: SqliteStorage,
        feed: Feed,
    }

    fn setup() -> Fixture {
        let storage = SqliteStorage::in_memory().unwrap();
        let user = SqliteUserRepository::new(storage.clone())
            .create("kahya")
            .unwrap();
        let feed = SqliteFeedRepository::new(storage.clone())
            .create("A", "http://a.test/feed", user.id)
            .unwrap();
        Fixture { storage, feed }
    }

    fn service(
        fx: &Fixture,
        fetcher: MockFeedFetcher,
    ) -> IngestService<SqliteFeedRepository, SqlitePostRepository, MockFeedFetcher> {
        IngestService::new(
            SqliteFeedRepository::new(fx.storage.clone()),
            SqlitePostRepository::new(fx.storage.clone()),
            fetcher,
        )
    }

    fn stored_feed(fx: &Fixture) -> Feed {
        SqliteFeedRepository::new(fx.storage.clone())
            .get_by_url(&fx.feed.url)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_parse_pub_date_numeric_zone() {
        let parsed = parse_pub_date("Thu, 28 Dec 2023 09:30:00 +0200").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 12, 28, 7, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_pub_date_rejects_other_formats() {
        assert!(parse_pub_date("Thu, 28 Dec 2023 09:30:00 GMT").is_none());
        assert!(parse_pub_date("2023-12-28T09:30:00Z").is_none());
        assert!(parse_pub_date("").is_none());
    }

    #[test]
    fn test_ingest_stores_items() {
        let fx = setup();
        let doc = document(vec![
            item("One", "http://a.test/1", Some("Thu, 28 Dec 2023 00:00:00 +0000")),
            item("Two", "http://a.test/2", None),
        ]);

        let report = service(&fx, fetcher_returning(doc)).ingest(&fx.feed);
        assert_eq!(report.new_posts, 2);
        assert!(report.error.is_none());

        let posts = SqlitePostRepository::new(fx.storage.clone());
        let one = posts.get_by_url("http://a.test/1").unwrap().unwrap();
        assert_eq!(one.feed_id, fx.feed.id);
        assert_eq!(one.title, "One");
        assert_eq!(one.description.as_deref(), Some("About One"));
        assert_eq!(
            one.published_at,
            Some(Utc.with_ymd_and_hms(2023, 12, 28, 0, 0, 0).unwrap())
        );
        assert!(stored_feed(&fx).last_fetched_at.is_some());
    }

    #[test]
    fn test_existing_post_url_is_silently_skipped() {
        let fx = setup();
        let posts = SqlitePostRepository::new(fx.storage.clone());
        posts
            .create(&NewPost::new(
                fx.feed.id,
                "Old".to_string(),
                "http://a.test/2".to_string(),
            ))
            .unwrap();

        let doc = document(vec![
            item("One", "http://a.test/1", None),
            item("Two", "http://a.test/2", None),
            item("Three", "http://a.test/3", None),
        ]);
        let report = service(&fx, fetcher_returning(doc)).ingest(&fx.feed);

        assert_eq!(report.new_posts, 2);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.failed, 0);
        assert!(report.error.is_none());
        assert_eq!(posts.count_for_feed(fx.feed.id).unwrap(), 3);
    }

    #[test]
    fn test_reingest_is_idempotent() {
        let fx = setup();
        let doc = document(vec![
            item("One", "http://a.test/1", None),
            item("Two", "http://a.test/2", None),
        ]);
        let service = service(&fx, fetcher_returning(doc));
        let posts = SqlitePostRepository::new(fx.storage.clone());

        service.ingest(&fx.feed);
        let first = posts.get_by_url("http://a.test/1").unwrap().unwrap();

        let second_run = service.ingest(&fx.feed);
        assert_eq!(second_run.new_posts, 0);
        assert_eq!(second_run.duplicates, 2);
        assert!(second_run.error.is_none());
        assert_eq!(posts.count_for_feed(fx.feed.id).unwrap(), 2);
        assert_eq!(posts.get_by_url("http://a.test/1").unwrap().unwrap(), first);
    }

    #[test]
    fn test_unparsable_pub_date_stored_as_null() {
        let fx = setup();
        let doc = document(vec![
            item("Bad", "http://a.test/bad", Some("yesterday-ish")),
            item("Good", "http://a.test/good", Some("Wed, 10 Jan 2024 00:00:00 +0000")),
        ]);

        let report = service(&fx, fetcher_returning(doc)).ingest(&fx.feed);
        assert_eq!(report.new_posts, 2);

        let posts = SqlitePostRepository::new(fx.storage.clone());
        let bad = posts.get_by_url("http://a.test/bad").unwrap().unwrap();
        assert!(bad.published_at.is_none());
        let good = posts.get_by_url("http://a.test/good").unwrap().unwrap();
        assert!(good.published_at.is_some());
    }

    #[test]
    fn test_fetch_failure_still_marks_fetched() {
        let fx = setup();
        let mut fetcher = MockFeedFetcher::new();
        fetcher.expect_fetch().times(1).returning(|url| {
            Err(GatorError::HttpStatus {
                url: url.to_string(),
                status: 500,
            })
        });

        let before = Utc::now() - Duration::seconds(1);
        let report = service(&fx, fetcher).ingest(&fx.feed);

        assert!(report.error.unwrap().contains("500"));
        assert_eq!(report.new_posts, 0);
        let marked = stored_feed(&fx).last_fetched_at.unwrap();
        assert!(marked > before);
    }

    #[test]
    fn test_parse_failure_is_not_fatal() {
        let fx = setup();
        let mut fetcher = MockFeedFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Err(GatorError::Parse("unexpected end of input".to_string())));

        let report = service(&fx, fetcher).ingest(&fx.feed);
        assert!(report.error.is_some());
        assert!(stored_feed(&fx).last_fetched_at.is_some());
    }

    #[test]
    fn test_unexpected_fetcher_error_is_reported() {
        let fx = setup();
        let mut fetcher = MockFeedFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Err(GatorError::Database(rusqlite::Error::InvalidQuery)));

        let report = service(&fx, fetcher).ingest(&fx.feed);
        assert!(report.error.unwrap().starts_with("Database error"));
        assert_eq!(report.items, 0);
    }

    #[test]
    fn test_mark_fetched_time_matches_store_precision() {
        let fx = setup();
        let report = service(&fx, fetcher_returning(FeedDocument::default())).ingest(&fx.feed);
        assert!(report.error.is_none());

        let marked = stored_feed(&fx).last_fetched_at.unwrap();
        assert_eq!(marked.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn test_marked_fetched_before_network_call() {
        let fx = setup();
        let feeds = SqliteFeedRepository::new(fx.storage.clone());
        let mut fetcher = MockFeedFetcher::new();
        fetcher.expect_fetch().returning(move |url| -> GatorResult<FeedDocument> {
            let feed = feeds.get_by_url(url)?.unwrap();
            assert!(feed.last_fetched_at.is_some());
            Ok(FeedDocument::default())
        });

        let report = service(&fx, fetcher).ingest(&fx.feed);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_mark_fetched_failure_skips_fetch() {
        let fx = setup();
        let mut feed_repo = MockFeedRepository::new();
        feed_repo
            .expect_mark_fetched()
            .returning(|_, _| Err(GatorError::Database(rusqlite::Error::InvalidQuery)));
        let mut fetcher = MockFeedFetcher::new();
        fetcher.expect_fetch().times(0);
        let mut post_repo = MockPostRepository::new();
        post_repo.expect_create().times(0);

        let report = IngestService::new(feed_repo, post_repo, fetcher).ingest(&fx.feed);
        assert!(report.error.is_some());
        assert_eq!(report.items, 0);
    }

    #[test]
    fn test_store_error_on_one_post_does_not_stop_others() {
        let fx = setup();
        let mut feed_repo = MockFeedRepository::new();
        let marked = fx.feed.clone();
        feed_repo
            .expect_mark_fetched()
            .returning(move |_, _| Ok(marked.clone()));
        let mut post_repo = MockPostRepository::new();
        post_repo.expect_create().times(3).returning(|post| {
            if post.url.ends_with("/broken") {
                Err(GatorError::Database(rusqlite::Error::InvalidQuery))
            } else {
                Ok(post.clone().into_post())
            }
        });
        let doc = document(vec![
            item("One", "http://a.test/1", None),
            item("Broken", "http://a.test/broken", None),
            item("Three", "http://a.test/3", None),
        ]);

        let report =
            IngestService::new(feed_repo, post_repo, fetcher_returning(doc)).ingest(&fx.feed);
        assert_eq!(report.items, 3);
        assert_eq!(report.new_posts, 2);
        assert_eq!(report.failed, 1);
        assert!(report.error.is_none());
    }
}
