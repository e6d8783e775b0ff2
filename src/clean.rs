use std::sync::LazyLock;

use regex::Regex;

static TIMESTAMP_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\d{2,}:)?\d{2}:\d{2}[.,]\d{3}[ \t]*-->[ \t]*(?:\d{2,}:)?\d{2}:\d{2}[.,]\d{3}(?:[ \t]+[A-Za-z-]+:[^\s]+)*",
    )
    .unwrap()
});
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x{FEFF}?WEBVTT[^\n]*(?:\r?\n[A-Za-z][\w-]*:[^\n]*)*").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>\n]*>").unwrap());

/// Flatten WebVTT text into a single line of spoken content.
///
/// Timestamp ranges (with any cue settings) go first, then the `WEBVTT`
/// header and its metadata lines, then every whitespace run collapses to
/// one space. The passes repeat until nothing changes, since collapsing
/// can join a range split across lines. Output never contains a timestamp
/// range or `WEBVTT`, and cleaning already-clean text returns it unchanged.
pub fn clean_vtt(raw: &str) -> String {
    let mut text = clean_pass(raw);
    loop {
        let next = clean_pass(&text);
        if next == text {
            return text;
        }
        text = next;
    }
}

fn clean_pass(raw: &str) -> String {
    let text = TIMESTAMP_RANGE.replace_all(raw, "");
    let text = HEADER.replace_all(&text, "");
    collapse_whitespace(&text)
}

/// Replace every `<...>` tag with a space and decode HTML entities.
pub fn strip_markup(raw: &str) -> String {
    let text = TAG.replace_all(raw, " ");
    html_escape::decode_html_entities(&text).to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
