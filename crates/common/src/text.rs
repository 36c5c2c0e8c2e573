/// Canonical form for any scraped text: newlines and tabs dropped, whitespace
/// runs collapsed to a single space, ends trimmed.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\n' && *c != '\t')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keeps at most `max_chars` characters (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  hello \n\t world  "), "hello world");
        assert_eq!(normalize("a\nb"), "ab");
        assert_eq!(normalize("\r\n  \u{a0}  "), "");
        assert_eq!(normalize("오늘의   베스트"), "오늘의 베스트");
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in ["", " x ", "a\t\tb\n c", "  \n", "가  나\u{3000}다", "x\r\ny"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
            assert!(!once.contains('\n') && !once.contains('\t'));
        }
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("안녕하세요", 2), "안녕");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
