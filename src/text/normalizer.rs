//! # Text Normalization
//!
//! Cleans review comments before classification: HTML markup, URLs and
//! symbol noise are removed, whitespace is collapsed. The output is a fixed
//! point of the transformation, so normalizing twice changes nothing.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Punctuation that survives normalization
const KEPT_PUNCTUATION: &[char] = &['.', ',', '!', '?', '\'', '"', '-', ':', ';', '(', ')'];

/// HTML entities decoded before tags are stripped
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&amp;", "&"),
];

/// Normalizer for review comments
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    /// Regex for HTML tags
    tag_regex: Regex,
    /// Regex for URL removal
    url_regex: Regex,
    /// Regex for multiple whitespace
    whitespace_regex: Regex,
    /// Regex for whitespace before closing punctuation
    detached_punct_regex: Regex,
    /// Lowercase the output
    lowercase: bool,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    /// Create a new normalizer that preserves case
    pub fn new() -> Self {
        Self {
            tag_regex: Regex::new(r"<[^>]*>").unwrap(),
            url_regex: Regex::new(r"(?i)https?://\S*|www\.\S+").unwrap(),
            whitespace_regex: Regex::new(r"\s+").unwrap(),
            detached_punct_regex: Regex::new(r" ([.,!?;:)])").unwrap(),
            lowercase: false,
        }
    }

    /// Lowercase normalized text
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Normalize a comment
    ///
    /// Steps:
    /// 1. Lowercasing (if enabled) and Unicode normalization (NFC)
    /// 2. Decode common HTML entities
    /// 3. Remove HTML tags
    /// 4. Remove URLs
    /// 5. Replace symbols other than basic punctuation with spaces
    /// 6. Collapse whitespace and re-attach punctuation
    /// 7. Repeat URL removal until re-attached punctuation forms no new URL
    pub fn normalize(&self, text: &str) -> String {
        let mut clean: String = if self.lowercase {
            text.to_lowercase().nfc().collect()
        } else {
            text.nfc().collect()
        };

        for (entity, replacement) in ENTITIES {
            if clean.contains(entity) {
                clean = clean.replace(entity, replacement);
            }
        }

        let no_tags = self.tag_regex.replace_all(&clean, " ");
        let no_urls = self.url_regex.replace_all(&no_tags, " ");

        let no_noise: String = no_urls
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c.is_whitespace() || KEPT_PUNCTUATION.contains(&c) {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        let mut clean = self.tidy(&no_noise);
        // "www .example.com" only becomes a URL once the dot is re-attached
        while self.url_regex.is_match(&clean) {
            let no_urls = self.url_regex.replace_all(&clean, " ");
            clean = self.tidy(&no_urls);
        }
        clean.trim().to_string()
    }

    /// Collapse whitespace and pull closing punctuation onto the previous word
    fn tidy(&self, text: &str) -> String {
        let collapsed = self.whitespace_regex.replace_all(text, " ");
        self.detached_punct_regex
            .replace_all(&collapsed, "$1")
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_html_and_url_removed() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("<b>Great</b> place! http://example.com"),
            "Great place!"
        );
    }

    #[test]
    fn test_line_breaks_and_entities() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("Clean &amp; quiet.<br/>Host was lovely&nbsp;:)"),
            "Clean quiet. Host was lovely:)"
        );
    }

    #[test]
    fn test_www_urls_and_symbols() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("Book again via www.airbnb.com/rooms/1 ★★★★★ 10/10 #happy"),
            "Book again via 10 10 happy"
        );
    }

    #[test]
    fn test_emoji_and_whitespace() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("  Super   cosy 😍🏡 \r\n flat  "), "Super cosy flat");
    }

    #[test]
    fn test_keeps_accented_text() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("Très propre, séjour agréable"),
            "Très propre, séjour agréable"
        );
    }

    #[test]
    fn test_only_noise_becomes_empty() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("https://example.com <br/> ✨✨"), "");
    }

    #[test]
    fn test_lowercase_option() {
        let normalizer = TextNormalizer::new().with_lowercase(true);
        assert_eq!(normalizer.normalize("Great PLACE!"), "great place!");
    }

    #[test]
    fn test_url_split_by_space_before_dot() {
        let normalizer = TextNormalizer::new();
        let once = normalizer.normalize("Book via www .example.com today");
        assert_eq!(once, "Book via today");
        assert_eq!(normalizer.normalize(&once), once);
    }

    #[test]
    fn test_url_split_by_empty_tag() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("www<i></i>.x"), "");
        assert_eq!(
            normalizer.normalize("Stay at www<b> </b>.beach.house , lovely"),
            "Stay at lovely"
        );
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "<b>Great</b> place! http://example.com",
            "&lt;b&gt;escaped&lt;/b&gt; markup , spaced ; punctuation !",
            "a#www.b c www. x http:/ /broken",
            "Clean &amp; quiet.<br/>Host was lovely&nbsp;:)",
            "Très   propre ,  séjour agréable ( vraiment ) !!",
            "wifi@home $40/night 100% <i>worth</i> it",
            "Cafe\u{301} nearby",
            "İSTANBUL flat",
            "Book via www .example.com today",
            "www<i></i>.x",
            "www . www .x , end",
            "",
            "   ",
        ];

        for lowercase in [false, true] {
            let normalizer = TextNormalizer::new().with_lowercase(lowercase);
            for sample in samples {
                let once = normalizer.normalize(sample);
                let twice = normalizer.normalize(&once);
                assert_eq!(once, twice, "not idempotent for {:?}", sample);
            }
        }
    }

    /// Fragments that exercise markup, entities, URLs and detached punctuation
    fn fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z0-9éÉß]{1,8}",
            Just(" ".to_string()),
            Just("  \n\t".to_string()),
            Just("www".to_string()),
            Just("www.".to_string()),
            Just("http://".to_string()),
            Just("https".to_string()),
            Just("<b>".to_string()),
            Just("</i>".to_string()),
            Just("<".to_string()),
            Just(">".to_string()),
            Just("&amp;".to_string()),
            Just("&lt;".to_string()),
            Just("&nbsp;".to_string()),
            Just("&".to_string()),
            Just("/".to_string()),
            Just("😍".to_string()),
            Just("e\u{301}".to_string()),
            "[.,!?;:()'\"#@%$*-]",
        ]
    }

    fn comment() -> impl Strategy<Value = String> {
        prop::collection::vec(fragment(), 0..24).prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(text in comment(), lowercase in any::<bool>()) {
            let normalizer = TextNormalizer::new().with_lowercase(lowercase);
            let once = normalizer.normalize(&text);
            let twice = normalizer.normalize(&once);
            prop_assert_eq!(&once, &twice);
        }

        #[test]
        fn prop_output_has_no_url_or_markup(text in comment()) {
            let normalizer = TextNormalizer::new();
            let once = normalizer.normalize(&text);
            prop_assert!(!normalizer.url_regex.is_match(&once), "url left in {:?}", once);
            prop_assert!(!once.contains('<') && !once.contains('&'));
            prop_assert_eq!(once.trim(), once.as_str());
        }

        #[test]
        fn prop_ascii_noise_is_idempotent(text in "[ -~]{0,80}") {
            let normalizer = TextNormalizer::new();
            let once = normalizer.normalize(&text);
            prop_assert_eq!(normalizer.normalize(&once), once);
        }
    }
}
