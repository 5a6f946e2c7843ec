//! App store listing metadata.
//!
//! Listings advertise the developer site through `appstore:` meta tags,
//! which only count when they are direct children of `<head>`:
//!
//! ```html
//! <head>
//!   <meta name="appstore:developer_url" content="https://www.example.com/app">
//!   <meta name="appstore:bundle_id" content="com.example.app">
//!   <meta name="appstore:store_id" content="SKU12345">
//! </head>
//! ```

use scraper::node::Element;
use scraper::Html;
use serde::Serialize;
use tracing::debug;

const DEVELOPER_URL_META: &str = "appstore:developer_url";
const BUNDLE_ID_META: &str = "appstore:bundle_id";
const STORE_ID_META: &str = "appstore:store_id";

/// Values of the `appstore:` meta tags; empty when a tag is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppStoreMetadata {
    pub developer_url: String,
    pub bundle_id: String,
    pub store_id: String,
}

impl AppStoreMetadata {
    fn record(&mut self, element: &Element) {
        let mut name = None;
        let mut content = "";
        for (key, value) in element.attrs() {
            if key.eq_ignore_ascii_case("name") {
                name = Some(value);
            } else if key.eq_ignore_ascii_case("content") {
                content = value;
            }
        }

        let Some(name) = name else {
            return;
        };
        let slot = if name.eq_ignore_ascii_case(DEVELOPER_URL_META) {
            &mut self.developer_url
        } else if name.eq_ignore_ascii_case(BUNDLE_ID_META) {
            &mut self.bundle_id
        } else if name.eq_ignore_ascii_case(STORE_ID_META) {
            &mut self.store_id
        } else {
            return;
        };
        *slot = content.to_string();
    }
}

fn is_element(element: Option<&Element>, tag: &str) -> bool {
    element.is_some_and(|element| element.name().eq_ignore_ascii_case(tag))
}

/// Extracts the `appstore:` meta tags from a listing page.
///
/// The document is walked depth-first in document order. `<meta>` elements
/// count only as immediate children of `<head>`, and nothing below `<body>`
/// is looked at. When a tag repeats, the last one wins. Broken or truncated
/// markup is repaired by the HTML5 parser, so this never fails.
pub fn extract_app_store_meta(html: &str) -> AppStoreMetadata {
    let document = Html::parse_document(html);
    if !document.errors.is_empty() {
        debug!(
            action = "parse",
            component = "listing_html",
            error_count = document.errors.len(),
            "Recovered from HTML parse errors"
        );
    }

    let mut metadata = AppStoreMetadata::default();
    // Each frame carries whether its parent is <head>.
    let mut stack = vec![(document.tree.root(), false)];

    while let Some((node, parent_is_head)) = stack.pop() {
        let element = node.value().as_element();
        if is_element(element, "body") {
            continue;
        }

        if parent_is_head && is_element(element, "meta") {
            if let Some(meta) = element {
                metadata.record(meta);
            }
        }

        let is_head = is_element(element, "head");
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev().map(|child| (child, is_head)));
    }

    debug!(
        action = "extract",
        component = "listing_meta",
        developer_url = %metadata.developer_url,
        bundle_id = %metadata.bundle_id,
        store_id = %metadata.store_id,
        "Extracted app store metadata"
    );
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_BASIC_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
	<head>
		<title>
			Example app listing
		</title>
		<meta charset="UTF-8">
		<meta name="appstore:developer_url" content="https://www.path.to/page">
		<meta name="appstore:bundle_id" content="com.example.myapp">
		<meta name="appstore:store_id" content="SKU12345">
	</head>
	<body>
		<h1>
			Example app
		</h1>
	</body>
</html>"#;

    const VALID_BASIC_HTML_UPPERCASE: &str = r#"
<!DOCTYPE HTML>
<HTML LANG="en">
	<HEAD>
		<TITLE>
			Example app listing
		</TITLE>
		<META CHARSET="UTF-8">
		<META NAME="appstore:developer_url" CONTENT="https://www.path.to/page">
		<META NAME="appstore:bundle_id" CONTENT="com.example.myapp">
		<META NAME="appstore:store_id" CONTENT="SKU12345">
	</HEAD>
	<BODY>
		<H1>
			Example app
		</H1>
	</BODY>
</HTML>"#;

    const VALID_TRUNCATED_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
	<head>
		<title>
			Example app listing
		</title>
		<meta charset="UTF-8">
		<meta name="appstore:developer_url" content="https://www.path.to/page">
		<meta name="appstore:bundle_id" content="com.example.myapp">
		<meta name="appstore:store_id" content="SKU12345">
	</head>"#;

    const META_IN_BODY: &str = r#"
<!DOCTYPE html>
<html lang="en">
	<head>
		<title>
			Example app listing
		</title>
		<meta charset="UTF-8">
	</head>
	<body>
		<meta name="appstore:developer_url" content="https://www.path.to/page">
		<meta name="appstore:bundle_id" content="com.example.myapp">
		<meta name="appstore:store_id" content="SKU12345">
		<h1>
			Example app
		</h1>
	</body>
</html>"#;

    fn expected() -> AppStoreMetadata {
        AppStoreMetadata {
            developer_url: "https://www.path.to/page".to_string(),
            bundle_id: "com.example.myapp".to_string(),
            store_id: "SKU12345".to_string(),
        }
    }

    #[test]
    fn extracts_tags_from_head() {
        assert_eq!(extract_app_store_meta(VALID_BASIC_HTML), expected());
    }

    #[test]
    fn uppercase_markup_matches() {
        assert_eq!(extract_app_store_meta(VALID_BASIC_HTML_UPPERCASE), expected());
    }

    #[test]
    fn truncated_document_still_yields_tags() {
        assert_eq!(extract_app_store_meta(VALID_TRUNCATED_HTML), expected());
    }

    #[test]
    fn tags_in_body_are_ignored() {
        assert_eq!(extract_app_store_meta(META_IN_BODY), AppStoreMetadata::default());
    }

    #[test]
    fn empty_document_yields_empty_metadata() {
        assert_eq!(extract_app_store_meta(""), AppStoreMetadata::default());
    }

    #[test]
    fn name_values_match_case_insensitively_but_content_is_verbatim() {
        let html = r#"<html><head>
            <meta name="AppStore:Developer_URL" content="HTTPS://Example.COM/Dev">
            <meta name="APPSTORE:BUNDLE_ID" content="Com.Example.App">
        </head><body></body></html>"#;
        let metadata = extract_app_store_meta(html);
        assert_eq!(metadata.developer_url, "HTTPS://Example.COM/Dev");
        assert_eq!(metadata.bundle_id, "Com.Example.App");
        assert_eq!(metadata.store_id, "");
    }

    #[test]
    fn last_duplicate_wins() {
        let html = r#"<html><head>
            <meta name="appstore:store_id" content="first">
            <meta name="appstore:store_id" content="second">
        </head></html>"#;
        assert_eq!(extract_app_store_meta(html).store_id, "second");
    }

    #[test]
    fn missing_content_clears_value() {
        let html = r#"<html><head>
            <meta name="appstore:bundle_id" content="com.example.app">
            <meta name="appstore:bundle_id">
        </head></html>"#;
        assert_eq!(extract_app_store_meta(html).bundle_id, "");
    }

    #[test]
    fn deeply_nested_body_tags_are_ignored() {
        let html = r#"<html><head>
            <meta name="appstore:developer_url" content="https://good.example.com">
        </head><body><div><section><div>
            <meta name="appstore:developer_url" content="https://evil.example.com">
        </div></section></div></body></html>"#;
        assert_eq!(
            extract_app_store_meta(html).developer_url,
            "https://good.example.com"
        );
    }

    #[test]
    fn unrecognized_meta_names_are_ignored() {
        let html = r#"<html><head>
            <meta name="description" content="An app">
            <meta property="appstore:developer_url" content="https://example.com">
        </head></html>"#;
        assert_eq!(extract_app_store_meta(html), AppStoreMetadata::default());
    }
}
