use clap::{Parser, Subcommand};

use crate::services::post_service::DEFAULT_BROWSE_LIMIT;

#[derive(Parser)]
#[command(name = "gator")]
#[command(about = "RSS aggregator that polls followed feeds and stores new posts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a user and log in as them
    Register {
        /// Unique user name
        name: String,
    },

    /// Switch the current user
    Login {
        /// Existing user name
        name: String,
    },

    /// Delete all users, feeds, follows and posts
    Reset,

    /// List all users
    Users,

    /// Add a feed and follow it as the current user
    #[command(name = "addfeed")]
    AddFeed {
        /// Display name for the feed
        name: String,
        /// Feed URL
        url: String,
    },

    /// List all feeds
    Feeds,

    /// Follow an existing feed
    Follow {
        /// Feed URL
        url: String,
    },

    /// List the feeds the current user follows
    Following,

    /// Stop following a feed
    Unfollow {
        /// Feed URL
        url: String,
    },

    /// Show the newest posts from followed feeds
    Browse {
        /// Number of posts to show
        #[arg(default_value_t = DEFAULT_BROWSE_LIMIT)]
        limit: usize,
    },

    /// Poll feeds forever, one cycle per interval
    Agg {
        /// Time between cycles, e.g. 30s, 1m, 1h30m
        #[arg(env = "GATOR_POLL_INTERVAL")]
        interval: String,

        /// Feeds ingested concurrently per cycle
        #[arg(short, long, default_value_t = 1)]
        workers: usize,
    },
}
