//! Logging helpers.

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// Safe to call more than once (tests); later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Log program startup.
pub fn log_startup(page_count: usize) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 answer formatting started - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📄 pages in submission: {}", page_count);
    info!("{}", "=".repeat(60));
}

/// Truncate long text for log display.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate_text("a longer text", 8), "a longer...");
    }
}
