use std::time::Duration;

/// In-game timer text, `mm:ss`.
pub fn format_timer(remaining: Duration) -> String {
    let total = remaining.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Lobby countdown text: `m:ss` while time remains, then "Game starting...".
pub fn format_lobby_countdown(remaining: Duration) -> String {
    let total = remaining.as_secs();
    if total == 0 {
        return "Game starting...".to_string();
    }
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_format() {
        assert_eq!(format_timer(Duration::from_secs(65)), "01:05");
        assert_eq!(format_timer(Duration::from_secs(3600)), "60:00");
        assert_eq!(format_timer(Duration::ZERO), "00:00");
    }

    #[test]
    fn test_lobby_format() {
        assert_eq!(format_lobby_countdown(Duration::from_millis(125_900)), "2:05");
        assert_eq!(format_lobby_countdown(Duration::from_millis(400)), "Game starting...");
    }
}
