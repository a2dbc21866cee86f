use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatorError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid poll interval: {0}")]
    InvalidInterval(String),

    // User errors
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("No user is logged in, run `gator login <name>` first")]
    NotLoggedIn,

    // Feed errors
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),

    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    #[error("Feed already exists: {0}")]
    FeedAlreadyExists(String),

    #[error("Already following feed: {0}")]
    AlreadyFollowing(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    // Parsing errors
    #[error("Feed parsing failed: {0}")]
    Parse(String),

    // Storage errors
    #[error("Post already stored: {0}")]
    DuplicatePostUrl(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl GatorError {
    /// True for failures of the network fetch or the document parse.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            GatorError::Http(_)
                | GatorError::HttpStatus { .. }
                | GatorError::Parse(_)
                | GatorError::InvalidUrl(_)
        )
    }
}

pub type GatorResult<T> = Result<T, GatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failures_classified() {
        assert!(GatorError::Parse("bad xml".to_string()).is_fetch_failure());
        assert!(GatorError::HttpStatus {
            url: "http://a.test/feed".to_string(),
            status: 404
        }
        .is_fetch_failure());
        assert!(!GatorError::DuplicatePostUrl("x".to_string()).is_fetch_failure());
        assert!(!GatorError::Config("x".to_string()).is_fetch_failure());
    }

    #[test]
    fn test_status_message() {
        let err = GatorError::HttpStatus {
            url: "http://a.test/feed".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "HTTP 503 from http://a.test/feed");
    }
}
