//! Text helpers for post content and search input.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HASHTAG: Regex = Regex::new(r"(?:^|[^\w#])#(\w{1,50})").unwrap();
    static ref FILTER_RESERVED: Regex = Regex::new(r#"[,()*%\\"]"#).unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Extract hashtags from post content, lowercased and de-duplicated in
/// order of first appearance.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for cap in HASHTAG.captures_iter(content) {
        let tag = cap[1].to_lowercase();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Make a free-text search term safe to embed in a PostgREST `or=(...)`
/// filter: reserved characters are removed and whitespace collapsed.
pub fn sanitize_search_term(term: &str) -> String {
    let stripped = FILTER_RESERVED.replace_all(term, " ");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_hashtags() {
        assert_eq!(
            extract_hashtags("Got my #Visa! Off to #germany #MSc #visa"),
            vec!["visa", "germany", "msc"]
        );
        assert!(extract_hashtags("no tags here, just a # sign").is_empty());
        assert!(extract_hashtags("email me at a#b").is_empty());
        assert_eq!(extract_hashtags("#start of line"), vec!["start"]);
    }

    #[test]
    fn test_sanitize_search_term() {
        assert_eq!(sanitize_search_term("  TU   Munich "), "TU Munich");
        assert_eq!(sanitize_search_term("a,b(c)*%"), "a b c");
        assert_eq!(sanitize_search_term(",,,"), "");
    }
}
