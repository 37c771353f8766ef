//! Turning a free-text model reply into advice lines.

use crate::error::UnusableReply;

/// Remove leading bullet or numbering punctuation and surrounding whitespace.
pub fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(|c: char| {
        c.is_whitespace() || c.is_ascii_digit() || matches!(c, '-' | '*' | '•' | '.' | ')')
    })
    .trim()
}

/// One advice line per non-empty reply line, bullets stripped.
pub fn parse_reply(text: &str) -> Result<Vec<String>, UnusableReply> {
    if text.is_empty() {
        return Err(UnusableReply::Empty);
    }
    let lines: Vec<String> = text
        .lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if lines.is_empty() {
        return Err(UnusableReply::NoAdvice);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_common_bullets() {
        assert_eq!(strip_bullet("1) Irrigate now"), "Irrigate now");
        assert_eq!(strip_bullet("- Irrigate now"), "Irrigate now");
        assert_eq!(strip_bullet("• Irrigate now"), "Irrigate now");
        assert_eq!(strip_bullet("  * Irrigate now  "), "Irrigate now");
        assert_eq!(strip_bullet("12. Irrigate now"), "Irrigate now");
    }

    #[test]
    fn test_strip_keeps_inner_text() {
        assert_eq!(
            strip_bullet("- Rain: 0.8 mm in the next hour"),
            "Rain: 0.8 mm in the next hour"
        );
    }

    #[test]
    fn test_parse_reply_drops_blank_and_bullet_only_lines() {
        let reply = "- Heat: shade livestock\n\n•\n2. Irrigation: water at dusk\n   \n";
        assert_eq!(
            parse_reply(reply).unwrap(),
            vec!["Heat: shade livestock", "Irrigation: water at dusk"]
        );
    }

    #[test]
    fn test_parse_reply_unusable() {
        assert_eq!(parse_reply(""), Err(UnusableReply::Empty));
        assert_eq!(parse_reply("\n - \n 1. \n"), Err(UnusableReply::NoAdvice));
    }
}
