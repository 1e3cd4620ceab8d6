use once_cell::sync::Lazy;
use regex::Regex;

use doccrawl_core::Author;

/// Split a cleaned author line into [`Author`]s.
///
/// Names are separated by `,` `;` `&` or the words `ve` / `and`. Trailing
/// affiliation marks (digits, `*`, `†`, superscripts) and leading academic
/// titles are removed. The last token of a name is the last name; a name
/// with a single token has no first name.
pub fn split_authors(line: &str) -> Vec<Author> {
    static SEP_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\s*(?:[,;&]|\bve\b|\band\b)\s*").unwrap());

    SEP_RE
        .split(line)
        .filter_map(|part| {
            let name = strip_decorations(part);
            let mut tokens: Vec<&str> = name.split_whitespace().collect();
            let last = tokens.pop()?;
            let first = (!tokens.is_empty()).then(|| tokens.join(" "));
            Some(Author {
                first_name: first,
                last_name: Some(last.to_string()),
            })
        })
        .collect()
}

fn strip_decorations(part: &str) -> String {
    static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?i)^(?:(?:Prof|Do[çc]|Dr|Ar[şs]\s*G[öo]r|[ÖO][ğg]r\s*G[öo]r|[ÖO][ğg]r\s*[ÜU]yesi|Assoc|Asst|Assist)\.?\s+)+",
        )
        .unwrap()
    });

    let trimmed = part
        .trim()
        .trim_end_matches(|c: char| {
            c.is_ascii_digit() || matches!(c, '*' | '†' | '‡' | '¹' | '²' | '³' | '.') || c.is_whitespace()
        });
    TITLE_RE.replace(trimmed, "").trim().to_string()
}
