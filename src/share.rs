//! Share-URL contract: one recognized query parameter, `letter=<id>`.

/// Builds the link the `send` flow hands back to the author.
pub fn build_share_url(base_url: &str, letter_id: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}letter={}",
        base_url,
        separator,
        urlencoding::encode(letter_id)
    )
}

/// Pulls the letter identifier out of a share URL or a bare query string.
/// Returns `None` when no `letter` parameter is present or it is empty.
pub fn extract_letter_id(input: &str) -> Option<String> {
    let query = match input.split_once('?') {
        Some((_, query)) => query,
        // Accept a bare "letter=abc" query string too.
        None if input.contains('=') => input,
        None => return None,
    };

    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            if key == "letter" && !value.is_empty() {
                return urlencoding::decode(value).ok().map(|v| v.into_owned());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_share_url() {
        assert_eq!(
            build_share_url("https://lovenote.cards/", "abc123"),
            "https://lovenote.cards/?letter=abc123"
        );
    }

    #[test]
    fn test_build_share_url_appends_to_existing_query() {
        assert_eq!(
            build_share_url("https://lovenote.cards/?utm=card", "abc123"),
            "https://lovenote.cards/?utm=card&letter=abc123"
        );
    }

    #[test]
    fn test_build_share_url_encodes_id() {
        assert_eq!(
            build_share_url("https://lovenote.cards/", "a b/c"),
            "https://lovenote.cards/?letter=a%20b%2Fc"
        );
    }

    #[test]
    fn test_extract_from_full_url() {
        assert_eq!(
            extract_letter_id("https://lovenote.cards/?letter=abc123"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_extract_among_other_params() {
        assert_eq!(
            extract_letter_id("https://lovenote.cards/?utm=x&letter=abc123&lang=en"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_extract_from_bare_query() {
        assert_eq!(
            extract_letter_id("letter=abc123"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_extract_decodes_value() {
        assert_eq!(
            extract_letter_id("letter=a%20b"),
            Some("a b".to_string())
        );
    }

    #[test]
    fn test_extract_absent_or_empty() {
        assert_eq!(extract_letter_id("https://lovenote.cards/"), None);
        assert_eq!(extract_letter_id("https://lovenote.cards/?letter="), None);
        assert_eq!(extract_letter_id("plain-text"), None);
    }
}
