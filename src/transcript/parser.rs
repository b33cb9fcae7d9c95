use html_escape::decode_html_entities;
use regex::Regex;
use std::sync::OnceLock;

use super::{ProviderError, Segment};

fn text_element() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)"#).expect("valid text element regex")
    })
}

fn attribute() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([a-zA-Z]+)\s*=\s*"([^"]*)""#).expect("valid attribute regex")
    })
}

fn inline_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

/// Parse YouTube's timed-text XML into ordered segments
pub fn parse_timed_text(xml: &str) -> Result<Vec<Segment>, ProviderError> {
    if !xml.contains("<transcript") {
        return Err(ProviderError::Unparsable(
            "timed text has no <transcript> root".to_string(),
        ));
    }

    let segments = text_element()
        .captures_iter(xml)
        .map(|caps| {
            let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let body = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

            let mut start = 0.0;
            let mut duration = 0.0;
            for attr in attribute().captures_iter(attrs) {
                match &attr[1] {
                    "start" => start = attr[2].parse().unwrap_or(0.0),
                    "dur" => duration = attr[2].parse().unwrap_or(0.0),
                    _ => {}
                }
            }

            Segment {
                text: clean_text(body),
                start,
                duration,
            }
        })
        .collect();

    Ok(segments)
}

// Caption bodies are XML-escaped once and frequently carry HTML-escaped
// entities and <font>/<i> markup inside that.
fn clean_text(body: &str) -> String {
    let unescaped = decode_html_entities(body);
    let stripped = inline_tag().replace_all(&unescaped, "");
    decode_html_entities(&stripped).into_owned()
}
