use std::collections::BTreeMap;

use fst::Map;
use fst::raw::Output;
use serde::Serialize;

use crate::data::{GlossaryEntry, Stem, fold};
use crate::link::{LinkDescriptor, anchor_id, make_link};

/// One piece of annotated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Segment {
    PlainText(String),
    GlossaryLink(GlossaryLink),
}

impl Segment {
    /// The source text this segment covers.
    pub fn text(&self) -> &str {
        match self {
            Segment::PlainText(text) => text,
            Segment::GlossaryLink(link) => &link.display_text,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Segment::GlossaryLink(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlossaryLink {
    /// The glossary word as defined, not as written in the text.
    pub term: String,
    pub display_text: String,
    pub entry: GlossaryEntry,
    pub same_document: bool,
}

impl GlossaryLink {
    fn new(entry: &GlossaryEntry, display_text: &str, same_document: bool) -> Self {
        Self {
            term: entry.word.clone(),
            display_text: display_text.to_string(),
            entry: entry.clone(),
            same_document,
        }
    }

    pub fn anchor_id(&self) -> String {
        anchor_id(&self.term)
    }

    pub fn link(&self) -> LinkDescriptor {
        make_link(&self.anchor_id(), &self.display_text, self.same_document)
    }
}

/// Automaton over the normalized stems of one annotation call.
///
/// Each key maps to the position of the first stem that carries it, so
/// duplicated words resolve to whichever entry was defined first.
pub struct StemIndex<'a> {
    stems: &'a [Stem<'a>],
    map: Map<Vec<u8>>,
}

impl<'a> StemIndex<'a> {
    pub fn new(stems: &'a [Stem<'a>]) -> Self {
        let mut keys: BTreeMap<&str, u64> = BTreeMap::new();
        for (position, stem) in stems.iter().enumerate() {
            if stem.is_matchable() {
                keys.entry(stem.stem.as_str()).or_insert(position as u64);
            }
        }
        let map = Map::from_iter(keys).expect("btree keys are sorted and unique");
        Self { stems, map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Splits `text` into plain and linked segments, left to right.
    pub fn annotate(&self, text: &str, same_document: bool) -> Vec<Segment> {
        let mut segments = Vec::new();
        if text.is_empty() {
            return segments;
        }
        let mut plain_start = 0;
        let mut cursor = 0;
        while cursor < text.len() {
            if !self.is_empty() && starts_word(text, cursor) {
                if let Some((end, position)) = self.longest_match(text, cursor) {
                    if plain_start < cursor {
                        segments.push(Segment::PlainText(text[plain_start..cursor].to_string()));
                    }
                    segments.push(Segment::GlossaryLink(GlossaryLink::new(
                        self.stems[position].entry,
                        &text[cursor..end],
                        same_document,
                    )));
                    cursor = end;
                    plain_start = end;
                    continue;
                }
            }
            cursor += text[cursor..].chars().next().map_or(1, char::len_utf8);
        }
        if plain_start < text.len() {
            segments.push(Segment::PlainText(text[plain_start..].to_string()));
        }
        segments
    }

    /// Walks the automaton from `start`, case-folding source characters as they
    /// are fed. Returns the end offset and stem position of the longest key
    /// that finishes on a word end.
    fn longest_match(&self, text: &str, start: usize) -> Option<(usize, usize)> {
        let fst = self.map.as_fst();
        let mut node = fst.root();
        let mut output = Output::zero();
        let mut best = None;
        let mut buf = [0u8; 4];
        'scan: for (offset, ch) in text[start..].char_indices() {
            for lower in fold(ch) {
                for &byte in lower.encode_utf8(&mut buf).as_bytes() {
                    let Some(index) = node.find_input(byte) else {
                        break 'scan;
                    };
                    let transition = node.transition(index);
                    output = output.cat(transition.out);
                    node = fst.node(transition.addr);
                }
            }
            let end = start + offset + ch.len_utf8();
            if node.is_final() && ends_word(text, end) {
                let position = output.cat(node.final_output()).value() as usize;
                best = Some((end, position));
            }
        }
        best
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn starts_word(text: &str, at: usize) -> bool {
    text[..at].chars().next_back().is_none_or(|ch| !is_word_char(ch))
}

fn ends_word(text: &str, at: usize) -> bool {
    text[at..].chars().next().is_none_or(|ch| !is_word_char(ch))
}

/// One-shot annotation of `text` against `stems`.
pub fn annotate(text: &str, same_document: bool, stems: &[Stem<'_>]) -> Vec<Segment> {
    StemIndex::new(stems).annotate(text, same_document)
}

/// Curried form of [`annotate`]: fix the text first, apply stem sets later.
pub fn link_from_stems(
    text: &str,
    same_document: bool,
) -> impl Fn(&[Stem<'_>]) -> Vec<Segment> + '_ {
    move |stems: &[Stem<'_>]| annotate(text, same_document, stems)
}
