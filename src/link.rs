use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

use crate::annotate::Segment;
use crate::data::normalize;

const GLOSSARY_PAGE: &str = "/glossary/";

/// Renderable hyperlink for a glossary term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkDescriptor {
    pub href: String,
    pub text: String,
}

/// Builds the link for `anchor_id`, either within the current page or on the glossary page.
pub fn make_link(anchor_id: &str, display_text: &str, same_document: bool) -> LinkDescriptor {
    let href = if same_document {
        format!("#{anchor_id}")
    } else {
        format!("{GLOSSARY_PAGE}#{anchor_id}")
    };
    LinkDescriptor {
        href,
        text: display_text.to_string(),
    }
}

/// Fragment identifier for a glossary word. Anything but ASCII alphanumerics is percent-encoded.
pub fn anchor_id(word: &str) -> String {
    let normalized = normalize(word);
    utf8_percent_encode(&normalized, NON_ALPHANUMERIC).to_string()
}

pub fn render_markdown(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::PlainText(text) => out.push_str(&escape_brackets(text)),
            Segment::GlossaryLink(link) => {
                let descriptor = link.link();
                out.push('[');
                out.push_str(&escape_brackets(&descriptor.text));
                out.push_str("](");
                out.push_str(&descriptor.href);
                out.push(')');
            }
        }
    }
    out
}

fn escape_brackets(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
