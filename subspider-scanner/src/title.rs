use scraper::{Html, Selector};
use std::sync::OnceLock;

pub const NO_TITLE: &str = "No Title";

fn title_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("title").unwrap())
}

/// Pull the first `<title>` out of a document.
///
/// html5ever recovers from any input, so malformed markup and plain text
/// simply come back as [`NO_TITLE`].
pub fn extract_title(body: &str) -> String {
    let document = Html::parse_document(body);

    document
        .select(title_selector())
        .next()
        .map(|element| {
            element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string())
}

/// Decode a response body using the charset from its `Content-Type`.
///
/// Unknown labels and bytes that are invalid for the declared charset fall
/// back to Latin-1, which maps every byte and therefore cannot fail.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let label = content_type.and_then(charset_label).unwrap_or("utf-8");

    if let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes())
        && let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes)
    {
        return text.into_owned();
    }

    decode_latin1(bytes)
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}
