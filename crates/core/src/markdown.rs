//! Minimal Markdown to HTML rendering for notification banners.
//!
//! Supports the subset editors use in short announcements: paragraphs,
//! hard line breaks (every newline becomes `<br />`), `**bold**`, `*italic*`,
//! `` `code` `` and `[text](https://link)`. All input is HTML-escaped first,
//! so raw tags in the source are shown literally. Code spans and link targets
//! are copied verbatim; emphasis only applies to the text around them, and
//! an asterisk next to whitespace (`2 * 3`) is never a delimiter.

use std::sync::LazyLock;

use regex::Regex;

/// A code span or an http(s) link; neither is scanned for emphasis.
static VERBATIM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`([^`]+)`|\[([^\]]+)\]\((https?://[^\s)]+)\)").expect("valid regex")
});
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*([^*\s](?:[^*]*[^*\s])?)\*\*").expect("valid regex")
});
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s](?:[^*]*[^*\s])?)\*").expect("valid regex"));

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn emphasize(text: &str) -> String {
    let bold = BOLD_RE.replace_all(text, "<strong>$1</strong>");
    ITALIC_RE.replace_all(&bold, "<em>$1</em>").into_owned()
}

fn render_inline(line: &str) -> String {
    let escaped = escape_html(line);
    let mut out = String::with_capacity(escaped.len());
    let mut last = 0;

    for caps in VERBATIM_RE.captures_iter(&escaped) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&emphasize(&escaped[last..whole.start()]));
        match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(code), _, _) => {
                out.push_str("<code>");
                out.push_str(code.as_str());
                out.push_str("</code>");
            }
            (None, Some(label), Some(href)) => {
                out.push_str(&format!(
                    r#"<a href="{}">{}</a>"#,
                    href.as_str(),
                    emphasize(label.as_str())
                ));
            }
            _ => out.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    out.push_str(&emphasize(&escaped[last..]));
    out
}

/// Render `text` to HTML.
pub fn render(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in normalized.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
        .iter()
        .map(|lines| {
            let body: Vec<String> = lines.iter().map(|l| render_inline(l)).collect();
            format!("<p>{}</p>", body.join("<br />\n"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
