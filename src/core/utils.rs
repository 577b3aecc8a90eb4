use crate::core::config::MAX_TITLE_LEN;

/// Strips filesystem-unsafe characters from a media title and caps its
/// length so it can be used as a filename stem.
///
/// Removed outright (no substitution characters inserted):
/// `< > : " / \ | ? *` and control characters. Titles longer than
/// [`MAX_TITLE_LEN`] characters are truncated to exactly that many.
///
/// # Example
///
/// ```
/// use tubedrop::core::utils::sanitize_title;
///
/// assert_eq!(sanitize_title("My:Video/Title?"), "MyVideoTitle");
/// ```
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') && !c.is_control())
        .take(MAX_TITLE_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_forbidden_characters_without_substitution() {
        assert_eq!(sanitize_title("My:Video/Title?"), "MyVideoTitle");
        assert_eq!(sanitize_title("a<b>c\"d\\e|f*g"), "abcdefg");
        assert_eq!(sanitize_title("plain title"), "plain title");
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(sanitize_title("line\nbreak\ttab"), "linebreaktab");
    }

    #[test]
    fn truncates_to_exactly_200_characters() {
        let long = "x".repeat(500);
        let sanitized = sanitize_title(&long);
        assert_eq!(sanitized.chars().count(), 200);

        // Truncation counts characters, not bytes
        let cyrillic = "д".repeat(300);
        assert_eq!(sanitize_title(&cyrillic).chars().count(), 200);
    }

    #[test]
    fn short_titles_are_untouched() {
        let exact = "y".repeat(200);
        assert_eq!(sanitize_title(&exact), exact);
        assert_eq!(sanitize_title(""), "");
    }
}
