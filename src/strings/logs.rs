pub const STARTING: &str = "Starting vierzehn...";

pub fn config_loaded(path: &str) -> String {
    format!("Loaded configuration from {path}")
}

pub fn logged_in(handle: &str) -> String {
    format!("Logged in as @{handle}")
}

pub fn ignoring_users(path: &str, count: usize, users: &[&str]) -> String {
    format!("Ignoring {count} users from {path}: {users:?}")
}

pub fn no_ignored_users(path: &str) -> String {
    format!("Nobody in {path} is ignored yet")
}

pub fn ignore_file_created(path: &str) -> String {
    format!("Setting up ignore-file in {path}")
}

pub fn ignore_file_unreadable(path: &str, err: &str) -> String {
    format!("Could not read ignore-file {path}, starting with an empty list: {err}")
}

pub fn ignore_persist_failed(user: &str, err: &str) -> String {
    format!("Failed to persist ignore-file after adding @{user}; the opt-out will not survive a restart: {err}")
}

pub fn forbidden_word(word: &str) -> String {
    format!("Would retweet, but forbidden word {word:?}")
}

pub fn forbidden_app(app: &str) -> String {
    format!("Ignoring tweet sent via {app}")
}

pub fn ignored_author(user: &str) -> String {
    format!("Would retweet from @{user}, but ignored")
}

pub fn wants_to_be_ignored(user: &str) -> String {
    format!("@{user} wants to be ignored")
}

pub fn loves_the_bot(user: &str) -> String {
    format!("@{user} loves the bot")
}

pub fn retweeting(user: &str, text: &str) -> String {
    format!("Retweeting @{user}: {text:?}")
}

pub fn replying(post_id: &str, text: &str) -> String {
    format!("Replying to {post_id}: {text:?}")
}

pub fn repost_dropped(post_id: &str, err: &str) -> String {
    format!("Dropping retweet of {post_id}: {err}")
}

pub fn reply_dropped(post_id: &str, err: &str) -> String {
    format!("Dropping reply to {post_id}: {err}")
}

pub const REDIS_NOT_CONFIGURED: &str = "No redis configured, counters disabled";
pub const REDIS_NOT_COMPILED: &str = "Built without the `redis` feature, counters disabled";

pub fn redis_connected(url: &str) -> String {
    format!("Successfully connected to redis at {url}")
}

pub fn redis_connect_fail(url: &str, err: &str) -> String {
    format!("Could not connect to redis at {url}, counters disabled: {err}")
}

pub fn counter_incr_fail(key: &str, err: &str) -> String {
    format!("Failed to increment {key}: {err}")
}

pub fn stream_rules_synced(terms: &[String]) -> String {
    format!("Tracking {terms:?}")
}

pub const STREAM_CONNECTING: &str = "Connecting to filtered stream...";
pub const STREAM_ENDED: &str = "Stream closed by remote";

pub fn stream_failed(err: &str) -> String {
    format!("Stream failed: {err}")
}

pub fn stream_stalled(secs: u64) -> String {
    format!("No data from stream for {secs}s, assuming the connection is dead")
}

pub fn reconnecting(delay_secs: u64) -> String {
    format!("Reconnecting in {delay_secs}s...")
}

pub fn malformed_post(err: &str) -> String {
    format!("Skipping malformed post: {err}")
}

pub const SHUTDOWN: &str = "Interrupted by user, shutting down...";

pub fn shutdown_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}
