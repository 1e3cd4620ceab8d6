use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Reduce a captured markup fragment to plain text.
///
/// - paragraph ends, line breaks and tabs become spaces
/// - all remaining tags are dropped (adjacent runs join without a gap)
/// - XML and numeric character references are decoded
/// - whitespace is collapsed and the result trimmed, including a stray
///   leading `:` left over from a split heading
pub fn clean_markup(fragment: &str) -> String {
    static BREAK_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)</(?:w:)?p>|</(?:w:)?tc>|<(?:w:)?(?:br|tab|cr)\b[^>]*/?>").unwrap()
    });
    static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

    let spaced = BREAK_RE.replace_all(fragment, " ");
    let stripped = TAG_RE.replace_all(&spaced, "");
    let decoded = decode_entities(&stripped);
    let collapsed = collapse_whitespace(&decoded);
    collapsed
        .trim_start_matches(':')
        .trim_start()
        .to_string()
}

/// Decode the five XML entities plus decimal and hex character references.
/// Unknown entities are left untouched.
pub fn decode_entities(text: &str) -> String {
    static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|(amp|lt|gt|quot|apos));").unwrap()
    });

    if !text.contains('&') {
        return text.to_string();
    }

    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let code = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok()
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok()
            } else {
                None
            };
            if let Some(code) = code {
                return char::from_u32(code)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string());
            }
            match &caps[3] {
                "amp" => "&",
                "lt" => "<",
                "gt" => ">",
                "quot" => "\"",
                _ => "'",
            }
            .to_string()
        })
        .into_owned()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
