use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::domain::Feed;
use crate::errors::{GatorError, GatorResult};
use crate::services::ingest_service::{IngestReport, IngestService};
use crate::sources::FeedFetcher;
use crate::storage::traits::{FeedRepository, PostRepository};

/// Parse a poll interval such as `30s`, `1m` or `1h30m`.
pub fn parse_interval(text: &str) -> GatorResult<Duration> {
    let interval = humantime::parse_duration(text.trim())
        .map_err(|e| GatorError::InvalidInterval(format!("{text}: {e}")))?;

    if interval.is_zero() {
        return Err(GatorError::InvalidInterval(format!(
            "{text}: must be greater than zero"
        )));
    }

    Ok(interval)
}

/// Timed loop driving one ingestion cycle per tick.
///
/// With one worker a cycle ingests the single stalest feed. With more, it
/// takes that many of the stalest feeds and ingests them on scoped threads;
/// the feeds in a batch are distinct and the tick joins every worker before
/// sleeping, so no feed is ever ingested twice at once.
pub struct Scheduler<F: FeedRepository, P: PostRepository, X: FeedFetcher> {
    feed_repository: F,
    ingest: IngestService<F, P, X>,
    workers: usize,
}

impl<F: FeedRepository, P: PostRepository, X: FeedFetcher> Scheduler<F, P, X> {
    pub fn new(
        feed_repository: F,
        ingest: IngestService<F, P, X>,
        workers: usize,
    ) -> GatorResult<Self> {
        if workers == 0 {
            return Err(GatorError::Config(
                "worker count must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            feed_repository,
            ingest,
            workers,
        })
    }

    /// Run until the process is killed. The first cycle starts immediately
    /// and later cycles start `interval` apart. A cycle that overruns the
    /// interval is followed by the next one without waiting.
    pub fn run(&self, interval: Duration) -> GatorResult<()> {
        self.run_ticks(interval, None)
    }

    fn run_ticks(&self, interval: Duration, max_ticks: Option<usize>) -> GatorResult<()> {
        if interval.is_zero() {
            return Err(GatorError::InvalidInterval(
                "must be greater than zero".to_string(),
            ));
        }

        info!(
            "Collecting feeds every {} with {} worker(s)",
            humantime::format_duration(interval),
            self.workers
        );

        let mut ticks = 0;
        loop {
            let started = Instant::now();
            self.run_cycle();
            ticks += 1;
            if max_ticks.is_some_and(|max| ticks >= max) {
                return Ok(());
            }

            let remaining = interval.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                debug!("Cycle overran the interval, starting the next one now");
            } else {
                thread::sleep(remaining);
            }
        }
    }

    /// One tick. Selection failures are logged and the tick is skipped.
    pub fn run_cycle(&self) -> Vec<IngestReport> {
        let feeds = match self.select_feeds() {
            Ok(feeds) => feeds,
            Err(e) => {
                error!("Couldn't get next feeds to fetch: {}", e);
                return Vec::new();
            }
        };

        if feeds.is_empty() {
            debug!("No feeds to fetch");
            return Vec::new();
        }

        if feeds.len() == 1 {
            info!("Fetching feed {}", feeds[0].name);
            return vec![self.ingest.ingest(&feeds[0])];
        }

        info!("Fetching {} feeds", feeds.len());
        thread::scope(|scope| {
            let handles: Vec<_> = feeds
                .iter()
                .map(|feed| (feed, scope.spawn(move || self.ingest.ingest(feed))))
                .collect();

            handles
                .into_iter()
                .filter_map(|(feed, handle)| match handle.join() {
                    Ok(report) => Some(report),
                    Err(_) => {
                        error!("Worker ingesting feed {} panicked", feed.name);
                        None
                    }
                })
                .collect()
        })
    }

    fn select_feeds(&self) -> GatorResult<Vec<Feed>> {
        if self.workers == 1 {
            Ok(self.feed_repository.next_to_fetch()?.into_iter().collect())
        } else {
            self.feed_repository.next_batch_to_fetch(self.workers)
        }
    }
}
