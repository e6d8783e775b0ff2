use serde::{Deserialize, Serialize};

const BOLD_MARKER: &str = "**";
const TAKEAWAYS: &str = "Key Takeaways:";

/// How `**` markers are turned into HTML
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Emphasis {
    /// Every marker becomes `<strong>`; tags are never closed
    #[default]
    OpenOnly,
    /// Markers alternate between `<strong>` and `</strong>`
    Paired,
}

/// Render completion text for direct embedding in an HTML page
pub fn format_summary(text: &str, emphasis: Emphasis) -> String {
    let text = match emphasis {
        Emphasis::OpenOnly => text.replace(BOLD_MARKER, "<strong>"),
        Emphasis::Paired => pair_bold_markers(text),
    };
    text.replace('\n', "<br>")
        .replace(TAKEAWAYS, &format!("<h2>{TAKEAWAYS}</h2>"))
}

fn pair_bold_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, part) in text.split(BOLD_MARKER).enumerate() {
        if i > 0 {
            out.push_str(if i % 2 == 1 { "<strong>" } else { "</strong>" });
        }
        out.push_str(part);
    }
    out
}
