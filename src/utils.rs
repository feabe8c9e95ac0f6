use std::time::Duration;

/// Renders a size in KB, switching to MB above 1024.
/// 2048 -> 2.00MB
/// 100 -> 100.00KB
pub fn kb_mb(kb: f64) -> String {
    if kb > 1024.0 {
        format!("{:.2}MB", kb / 1024.0)
    } else {
        format!("{:.2}KB", kb)
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = elapsed.as_secs_f64() - (hours * 3600 + minutes * 60) as f64;

    if hours > 0 {
        format!("{}h {}m {:.2}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {:.2}s", minutes, secs)
    } else if total > 0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.2}ms", secs * 1000.0)
    }
}

/// `host` or `host:port`; the port only shows when it is not the scheme default.
pub fn host_of(url: &url::Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
