use std::time::Duration;

use feed_rs::parser;
use reqwest::blocking::Client;
use rss::Channel;
use tracing::debug;
use url::Url;

use crate::errors::{GatorError, GatorResult};
use crate::sources::traits::{FeedDocument, FeedFetcher, FeedItem};

/// User agent sent when the configuration does not supply one.
pub const DEFAULT_USER_AGENT: &str = concat!("gator/", env!("CARGO_PKG_VERSION"));

/// Feed fetcher over a blocking HTTP client.
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> GatorResult<Self> {
        let mut builder = Client::builder().user_agent(user_agent.to_string());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl FeedFetcher for HttpFeedFetcher {
    fn fetch(&self, url: &str) -> GatorResult<FeedDocument> {
        let url = validate_feed_url(url)?;

        let response = self.client.get(url.clone()).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatorError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes()?;
        debug!("Fetched {} bytes from {}", bytes.len(), url);

        parse_document(&bytes)
    }
}

/// Feeds must be absolute http(s) URLs.
pub fn validate_feed_url(url: &str) -> GatorResult<Url> {
    let parsed = Url::parse(url).map_err(|e| GatorError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(GatorError::InvalidUrl(format!(
            "{url}: unsupported scheme '{other}'"
        ))),
    }
}

/// Parse a syndication document.
///
/// RSS is read with the `rss` crate so `pubDate` keeps its source text.
/// Anything else (Atom, JSON Feed) goes through `feed-rs`, whose parsed
/// timestamps are written back out as RFC 2822 text.
pub fn parse_document(bytes: &[u8]) -> GatorResult<FeedDocument> {
    match Channel::read_from(bytes) {
        Ok(channel) => Ok(from_channel(&channel)),
        Err(rss_err) => match parser::parse(bytes) {
            Ok(feed) => Ok(from_feed_rs(feed)),
            Err(e) => Err(GatorError::Parse(format!("{rss_err}; {e}"))),
        },
    }
}

fn from_channel(channel: &Channel) -> FeedDocument {
    let items = channel
        .items()
        .iter()
        .map(|item| FeedItem {
            title: item.title().unwrap_or_default().to_string(),
            description: item.description().map(str::to_string),
            link: item.link().unwrap_or_default().to_string(),
            pub_date: item.pub_date().map(str::to_string),
        })
        .collect();

    FeedDocument {
        title: channel.title().to_string(),
        items,
    }
}

fn from_feed_rs(feed: feed_rs::model::Feed) -> FeedDocument {
    let items = feed
        .entries
        .into_iter()
        .map(|entry| FeedItem {
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            description: entry.summary.map(|s| s.content),
            link: entry
                .links
                .into_iter()
                .next()
                .map(|l| l.href)
                .unwrap_or_default(),
            pub_date: entry.published.or(entry.updated).map(|dt| dt.to_rfc2822()),
        })
        .collect();

    FeedDocument {
        title: feed.title.map(|t| t.content).unwrap_or_default(),
        items,
    }
}
