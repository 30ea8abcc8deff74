//! Plain-text extraction from fetched product pages.

use crate::error::DocumentError;

/// Turns raw fetched bytes into the plain text that gets shingled.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, raw: &[u8]) -> Result<String, DocumentError>;
}

/// Markup stripper for scraped pages.
///
/// Drops tags, comments and the bodies of `<script>` and `<style>`, decodes
/// the common named entities and collapses whitespace. Input without markup
/// passes through with only whitespace collapsed.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlTextExtractor;

impl TextExtractor for HtmlTextExtractor {
    fn extract(&self, raw: &[u8]) -> Result<String, DocumentError> {
        let markup = std::str::from_utf8(raw)
            .map_err(|err| DocumentError::Extraction(format!("not valid UTF-8: {err}")))?;
        let text = strip_markup(markup)?;
        Ok(decode_entities(&text)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" "))
    }
}

fn strip_markup(markup: &str) -> Result<String, DocumentError> {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let tag = &rest[open..];
        if !opens_markup(tag) {
            out.push('<');
            rest = &tag[1..];
            continue;
        }
        if let Some(comment) = tag.strip_prefix("<!--") {
            let end = comment.find("-->").ok_or_else(|| unterminated("comment"))?;
            rest = &comment[end + 3..];
            continue;
        }
        let close = tag.find('>').ok_or_else(|| unterminated("tag"))?;
        let inner = &tag[1..close];
        rest = &tag[close + 1..];
        if let Some(name) = raw_text_element(inner) {
            // ASCII lowercasing keeps byte offsets intact.
            let end_tag = format!("</{name}");
            let end = rest
                .to_ascii_lowercase()
                .find(&end_tag)
                .ok_or_else(|| unterminated(name))?;
            let after = &rest[end..];
            let close = after.find('>').ok_or_else(|| unterminated(name))?;
            rest = &after[close + 1..];
        }
        out.push(' ');
    }
    out.push_str(rest);
    Ok(out)
}

/// A `<` starts markup only when followed by a letter, `/`, `!` or `?`.
fn opens_markup(tag: &str) -> bool {
    tag[1..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

/// `script` or `style` when `inner` opens one of them.
fn raw_text_element(inner: &str) -> Option<&'static str> {
    if inner.starts_with('/') || inner.ends_with('/') {
        return None;
    }
    let name = inner
        .split(|c: char| c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match name.as_str() {
        "script" => Some("script"),
        "style" => Some("style"),
        _ => None,
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn unterminated(what: &str) -> DocumentError {
    DocumentError::Extraction(format!("unterminated {what}"))
}
