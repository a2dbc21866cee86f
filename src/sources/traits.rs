use crate::errors::GatorResult;

/// One entry of a syndication document, as published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    /// Publish date exactly as it appeared in the document.
    pub pub_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDocument {
    pub title: String,
    pub items: Vec<FeedItem>,
}

#[cfg_attr(test, mockall::automock)]
pub trait FeedFetcher: Send + Sync {
    /// Fetch `url` and parse the body into a document.
    ///
    /// Transport failures and non-2xx responses are fetch failures; a body
    /// that is not a syndication document is a parse failure. No retries.
    fn fetch(&self, url: &str) -> GatorResult<FeedDocument>;
}
