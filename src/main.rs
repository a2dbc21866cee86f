use clap::Parser;
use tracing::info;

use gator::cli::{Cli, Commands};
use gator::config::Config;
use gator::domain::User;
use gator::errors::{GatorError, GatorResult};
use gator::logging;
use gator::services::{
    parse_interval, FeedService, IngestService, PostService, Scheduler, UserService,
};
use gator::sources::HttpFeedFetcher;
use gator::storage::sqlite::{
    SqliteFeedFollowRepository, SqliteFeedRepository, SqlitePostRepository, SqliteStorage,
    SqliteUserRepository,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> GatorResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load()?;
    logging::init(&config.log_level);

    // Initialize storage
    let storage = SqliteStorage::new(&config.db_path)?;

    match cli.command {
        Commands::Register { name } => cmd_register(&name, &storage, &mut config),
        Commands::Login { name } => cmd_login(&name, &storage, &mut config),
        Commands::Reset => cmd_reset(&storage),
        Commands::Users => cmd_users(&storage, &config),
        Commands::AddFeed { name, url } => cmd_add_feed(&name, &url, &storage, &config),
        Commands::Feeds => cmd_feeds(&storage),
        Commands::Follow { url } => cmd_follow(&url, &storage, &config),
        Commands::Following => cmd_following(&storage, &config),
        Commands::Unfollow { url } => cmd_unfollow(&url, &storage, &config),
        Commands::Browse { limit } => cmd_browse(limit, &storage, &config),
        Commands::Agg { interval, workers } => cmd_agg(&interval, workers, &storage, &config),
    }
}

fn user_service(storage: &SqliteStorage) -> UserService<SqliteUserRepository> {
    UserService::new(SqliteUserRepository::new(storage.clone()))
}

fn feed_service(
    storage: &SqliteStorage,
) -> FeedService<SqliteFeedRepository, SqliteFeedFollowRepository> {
    FeedService::new(
        SqliteFeedRepository::new(storage.clone()),
        SqliteFeedFollowRepository::new(storage.clone()),
    )
}

fn current_user(storage: &SqliteStorage, config: &Config) -> GatorResult<User> {
    let name = config.current_user_name()?;
    user_service(storage).current(name)
}

fn cmd_register(name: &str, storage: &SqliteStorage, config: &mut Config) -> GatorResult<()> {
    let user = user_service(storage).register(name)?;
    config.set_current_user(&user.name)?;

    println!("User '{}' registered and logged in", user.name);
    Ok(())
}

fn cmd_login(name: &str, storage: &SqliteStorage, config: &mut Config) -> GatorResult<()> {
    let user = user_service(storage).login(name)?;
    config.set_current_user(&user.name)?;

    println!("Logged in as '{}'", user.name);
    Ok(())
}

fn cmd_reset(storage: &SqliteStorage) -> GatorResult<()> {
    let removed = user_service(storage).reset()?;
    println!("Reset complete: removed {} users", removed);
    Ok(())
}

fn cmd_users(storage: &SqliteStorage, config: &Config) -> GatorResult<()> {
    let users = user_service(storage).list()?;

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    let current = config.file.current_user_name.as_deref();
    for user in users {
        if Some(user.name.as_str()) == current {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }

    Ok(())
}

fn cmd_add_feed(name: &str, url: &str, storage: &SqliteStorage, config: &Config) -> GatorResult<()> {
    let user = current_user(storage, config)?;

    match feed_service(storage).add(&user, name, url) {
        Ok((feed, _)) => {
            println!("Feed added successfully!");
            println!("  Name: {}", feed.name);
            println!("  URL: {}", feed.url);
            println!("  Following as: {}", user.name);
            Ok(())
        }
        Err(GatorError::FeedAlreadyExists(_)) => {
            println!("Feed already exists: {}", url);
            println!("Use `gator follow {}` to follow it.", url);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn cmd_feeds(storage: &SqliteStorage) -> GatorResult<()> {
    let feeds = feed_service(storage).list()?;

    if feeds.is_empty() {
        println!("No feeds configured.");
        return Ok(());
    }

    println!("Feeds:\n");
    for entry in feeds {
        println!("  {}", entry.feed.name);
        println!("    URL: {}", entry.feed.url);
        println!("    Added by: {}", entry.user_name);
        match entry.feed.last_fetched_at {
            Some(at) => println!("    Last fetched: {}", at.to_rfc3339()),
            None => println!("    Last fetched: never"),
        }
        println!();
    }

    Ok(())
}

fn cmd_follow(url: &str, storage: &SqliteStorage, config: &Config) -> GatorResult<()> {
    let user = current_user(storage, config)?;
    let follow = feed_service(storage).follow(&user, url)?;

    println!(
        "Now following feed '{}' as user '{}'",
        follow.feed_name, follow.user_name
    );
    Ok(())
}

fn cmd_following(storage: &SqliteStorage, config: &Config) -> GatorResult<()> {
    let user = current_user(storage, config)?;
    let follows = feed_service(storage).following(&user)?;

    if follows.is_empty() {
        println!("You are not following any feeds.");
        return Ok(());
    }

    println!("Feeds you are following:");
    for follow in follows {
        println!("- {}", follow.feed_name);
    }
    Ok(())
}

fn cmd_unfollow(url: &str, storage: &SqliteStorage, config: &Config) -> GatorResult<()> {
    let user = current_user(storage, config)?;
    feed_service(storage).unfollow(&user, url)?;

    println!("Unfollowed feed with URL: {}", url);
    Ok(())
}

fn cmd_browse(limit: usize, storage: &SqliteStorage, config: &Config) -> GatorResult<()> {
    let user = current_user(storage, config)?;
    let posts = PostService::new(SqlitePostRepository::new(storage.clone())).browse(&user, limit)?;

    println!("Found {} posts for user {}:", posts.len(), user.name);
    for entry in posts {
        let date = entry
            .post
            .published_at
            .map(|at| at.format("%a %b %-d").to_string())
            .unwrap_or_else(|| "undated".to_string());

        println!("{} from {}", date, entry.feed_name);
        println!("--- {} ---", entry.post.title);
        if let Some(description) = entry.post.description.as_deref() {
            println!("    {}", description);
        }
        println!("Link: {}", entry.post.url);
        println!("=====================================");
    }

    Ok(())
}

fn cmd_agg(interval: &str, workers: usize, storage: &SqliteStorage, config: &Config) -> GatorResult<()> {
    // Invalid intervals stop here, before the loop starts
    let interval = parse_interval(interval)?;

    let fetcher = HttpFeedFetcher::new(&config.user_agent, config.fetch_timeout)?;
    let ingest = IngestService::new(
        SqliteFeedRepository::new(storage.clone()),
        SqlitePostRepository::new(storage.clone()),
        fetcher,
    );
    let scheduler = Scheduler::new(SqliteFeedRepository::new(storage.clone()), ingest, workers)?;

    info!("Using database {}", config.db_path);
    scheduler.run(interval)
}
