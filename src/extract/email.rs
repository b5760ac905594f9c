//! Email address extraction from page content
//!
//! Extraction is a pure function of its input: no I/O, no errors. Malformed
//! markup or plain text is accepted as-is and simply yields fewer matches.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node, Selector};
use std::collections::HashSet;

/// Local part, `@`, then at least two dot-separated labels ending in an
/// alphabetic TLD. `user@localhost`-style addresses are rejected.
const EMAIL_PATTERN: &str = r"(?i)[a-z0-9_][a-z0-9_.%+-]*@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,24}\b";

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"));

static EXACT_EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^(?:{})$", EMAIL_PATTERN)).expect("anchored email pattern compiles")
});

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector parses"));

/// File extensions that show up after an `@` in asset names like `logo@2x.png`
const ASSET_SUFFIXES: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp", "css", "js"];

/// Elements whose text is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracts every distinct email address from a page
///
/// Looks at the visible text of the document and at `mailto:` link targets.
/// All addresses are lower-cased.
///
/// # Examples
///
/// ```
/// use contact_harvest::extract::extract_emails;
///
/// let found = extract_emails("contact me at a@b.com or bad@nope");
/// assert_eq!(found.len(), 1);
/// assert!(found.contains("a@b.com"));
/// ```
pub fn extract_emails(page_content: &str) -> HashSet<String> {
    let mut emails = HashSet::new();
    if page_content.trim().is_empty() {
        return emails;
    }

    let document = Html::parse_document(page_content);

    for element in document.select(&ANCHOR_SELECTOR) {
        if let Some(href) = element.value().attr("href") {
            collect_mailto(href, &mut emails);
        }
    }

    let text = visible_text(&document);
    collect_matches(&text, &mut emails);

    emails
}

/// Returns the normalized form of an address, if it is a valid one
///
/// The whole input (after trimming) must be a single address.
pub fn normalize_email(raw: &str) -> Option<String> {
    let candidate = raw.trim();
    if EXACT_EMAIL_REGEX.is_match(candidate) && !has_asset_suffix(candidate) {
        Some(candidate.to_lowercase())
    } else {
        None
    }
}

/// Checks whether a string is a single syntactically valid address
pub fn is_valid_email(raw: &str) -> bool {
    normalize_email(raw).is_some()
}

fn collect_mailto(href: &str, emails: &mut HashSet<String>) {
    let href = href.trim();
    let Some(prefix) = href.get(..7) else {
        return;
    };
    if !prefix.eq_ignore_ascii_case("mailto:") {
        return;
    }

    let encoded = href[7..].split('?').next().unwrap_or_default();
    let recipients = match urlencoding::decode(encoded) {
        Ok(decoded) => decoded,
        Err(_) => {
            tracing::trace!("Skipping mailto with non-UTF-8 escapes: {}", href);
            return;
        }
    };

    for recipient in recipients.split(',') {
        collect_matches(recipient, emails);
    }
}

fn collect_matches(text: &str, emails: &mut HashSet<String>) {
    for found in EMAIL_REGEX.find_iter(text) {
        let email = found.as_str();
        if !covers_whole_token(text.as_bytes(), found.start(), found.end()) {
            tracing::trace!("Skipping match cut from a longer token: {}", email);
            continue;
        }
        if has_asset_suffix(email) {
            tracing::trace!("Skipping asset-like match: {}", email);
            continue;
        }
        emails.insert(email.to_lowercase());
    }
}

/// A match may not start or end in the middle of an address-like token
///
/// `regex` has no lookaround, so the neighbouring bytes are checked here. A
/// single trailing dot is sentence punctuation unless a label follows it.
fn covers_whole_token(text: &[u8], start: usize, end: usize) -> bool {
    let starts_clean = start == 0 || !is_local_part_byte(text[start - 1]);

    let ends_clean = match &text[end..] {
        [b'-' | b'_', ..] => false,
        [next, ..] if next.is_ascii_alphanumeric() => false,
        [b'.', next, ..] => !(next.is_ascii_alphanumeric() || *next == b'-'),
        _ => true,
    };

    starts_clean && ends_clean
}

fn is_local_part_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"_.%+-".contains(&byte)
}

/// Joins every rendered text node with a space so adjacent nodes never fuse
fn visible_text(document: &Html) -> String {
    let mut text = String::new();

    for node in document.root_element().descendants() {
        let Node::Text(fragment) = node.value() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .map(|element| HIDDEN_ELEMENTS.contains(&element.name()))
            .unwrap_or(false);
        if hidden {
            continue;
        }

        let fragment: &str = fragment;
        text.push_str(fragment.trim());
        text.push(' ');
    }

    text
}

fn has_asset_suffix(email: &str) -> bool {
    email
        .rsplit('.')
        .next()
        .map(|tld| {
            ASSET_SUFFIXES
                .iter()
                .any(|suffix| tld.eq_ignore_ascii_case(suffix))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rejects_domain_without_suffix() {
        let found = extract_emails("contact me at a@b.com or bad@nope");
        assert_eq!(found, set(&["a@b.com"]));
    }

    #[test]
    fn test_suffix_boundary() {
        assert!(extract_emails("bad@nope").is_empty());
        assert!(extract_emails("bad@nope.").is_empty());
        assert!(extract_emails("bad@nope.c").is_empty());
        assert_eq!(extract_emails("ok@nope.co"), set(&["ok@nope.co"]));
    }

    #[test]
    fn test_trailing_punctuation_not_included() {
        let found = extract_emails("<p>Write to info@example.org.</p>");
        assert_eq!(found, set(&["info@example.org"]));
    }

    #[test]
    fn test_lowercases_and_dedupes() {
        let html = r#"<html><body>
            <p>Sales: Sales@Example.com</p>
            <p>sales@example.com</p>
            <a href="mailto:SALES@example.com">mail us</a>
        </body></html>"#;
        assert_eq!(extract_emails(html), set(&["sales@example.com"]));
    }

    #[test]
    fn test_mailto_with_query_and_multiple_recipients() {
        let html = r#"<a href="mailto:one@example.com,two@example.com?subject=Hi">Write</a>"#;
        assert_eq!(
            extract_emails(html),
            set(&["one@example.com", "two@example.com"])
        );
    }

    #[test]
    fn test_mailto_only_in_attribute() {
        let html = r#"<a href="mailto:hidden@example.com">Email us</a>"#;
        assert_eq!(extract_emails(html), set(&["hidden@example.com"]));
    }

    #[test]
    fn test_mailto_percent_encoded_recipients() {
        let html = r#"<a href="mailto:%20info@x.com">m</a>"#;
        assert_eq!(extract_emails(html), set(&["info@x.com"]));

        let html = r#"<a href="mailto:info%40x.com">m</a>"#;
        assert_eq!(extract_emails(html), set(&["info@x.com"]));

        let html = r#"<a href="mailto:sales%2Bde@x.com,%20ops%40x.com?cc=a%40x.com">m</a>"#;
        assert_eq!(extract_emails(html), set(&["sales+de@x.com", "ops@x.com"]));
    }

    #[test]
    fn test_match_covers_whole_token() {
        assert!(extract_emails("x@a.test-foo").is_empty());
        assert!(extract_emails("x@a.test.1foo").is_empty());
        assert!(extract_emails(".info@x.com").is_empty());
        assert!(extract_emails("%20info@x.com").is_empty());
        assert_eq!(extract_emails("_info@x.com"), set(&["_info@x.com"]));
        assert_eq!(extract_emails("first_last@x.com"), set(&["first_last@x.com"]));
        assert_eq!(
            extract_emails("Mail: info@x.com, or (help@x.com)."),
            set(&["info@x.com", "help@x.com"])
        );
    }

    #[test]
    fn test_entity_encoded_at_sign() {
        let html = "<p>press&#64;example.com</p>";
        assert_eq!(extract_emails(html), set(&["press@example.com"]));
    }

    #[test]
    fn test_adjacent_nodes_do_not_fuse() {
        let html = "<p>team</p><p>@example.com</p>";
        assert!(extract_emails(html).is_empty());
    }

    #[test]
    fn test_script_text_ignored() {
        let html = r#"<html><head><script>var e = "bot@tracker.io";</script></head>
            <body>real@example.com</body></html>"#;
        assert_eq!(extract_emails(html), set(&["real@example.com"]));
    }

    #[test]
    fn test_asset_names_rejected() {
        let html = r#"<p>logo@2x.png icon@3x.webp hello@example.com</p>"#;
        assert_eq!(extract_emails(html), set(&["hello@example.com"]));
    }

    #[test]
    fn test_empty_and_malformed_input() {
        assert!(extract_emails("").is_empty());
        assert!(extract_emails("   ").is_empty());
        assert!(extract_emails("<<<>>><a href=").is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent_under_union() {
        let html = "<p>a@example.com b@example.com a@example.com</p>";
        let first = extract_emails(html);
        let mut union = first.clone();
        union.extend(extract_emails(html));
        assert_eq!(union.len(), first.len());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Jane.Doe+tag@Mail.Example.com "),
            Some("jane.doe+tag@mail.example.com".to_string())
        );
        assert_eq!(normalize_email("bad@nope"), None);
        assert_eq!(normalize_email("a@b.com and more"), None);
        assert_eq!(normalize_email("logo@2x.png"), None);
        assert!(is_valid_email("x@a.test"));
    }
}
