mod annotate;
mod data;
mod link;
mod source;

pub use annotate::{GlossaryLink, Segment, StemIndex, annotate, link_from_stems};
pub use data::{GlossaryEntry, Stem};
pub use link::{LinkDescriptor, anchor_id, make_link, render_markdown};
pub use source::{
    FnGlossary, GlossaryError, GlossarySource, JsonGlossaryFile, StaticGlossary, from_fn,
};

use rayon::prelude::*;
use tracing::{debug, warn};

/// Normalizes every entry into its matching stem, preserving order.
pub fn stem_text(entries: &[GlossaryEntry]) -> Vec<Stem<'_>> {
    entries.iter().map(Stem::from_entry).collect()
}

/// Annotates `text` against stems the caller already built, linking across pages.
pub fn link_text_with_stems(text: Option<&str>, stems: &[Stem<'_>]) -> Vec<Segment> {
    link_from_stems(text.unwrap_or_default(), false)(stems)
}

/// Fetches the glossary from `source` and links every term found in `text`.
///
/// A missing text is treated as empty and yields no segments. Fetch failures
/// are returned as-is; nothing is annotated in that case.
#[tracing::instrument(level = "debug", skip_all)]
pub async fn link_text_from_glossary<S>(
    source: &S,
    text: Option<&str>,
) -> Result<Vec<Segment>, GlossaryError>
where
    S: GlossarySource,
{
    let entries = fetch_entries(source).await?;
    let stems = stem_text(&entries);
    let segments = link_text_with_stems(text, &stems);
    debug!(
        entries = entries.len(),
        segments = segments.len(),
        links = segments.iter().filter(|s| s.is_link()).count(),
        "linked text against glossary"
    );
    Ok(segments)
}

/// Like [`link_text_from_glossary`] for many texts at once: one fetch, one
/// index, texts annotated in parallel. Results keep the input order.
///
/// Only the fetch yields. The annotation itself runs to completion on the
/// calling task, so large batches block that executor thread until rayon is
/// done; hand very large batches to `spawn_blocking` on the caller side.
#[tracing::instrument(level = "debug", skip_all, fields(texts = texts.len()))]
pub async fn link_texts_from_glossary<S>(
    source: &S,
    texts: &[Option<&str>],
) -> Result<Vec<Vec<Segment>>, GlossaryError>
where
    S: GlossarySource,
{
    let entries = fetch_entries(source).await?;
    let stems = stem_text(&entries);
    let index = StemIndex::new(&stems);
    let annotated: Vec<Vec<Segment>> = texts
        .par_iter()
        .map(|text| index.annotate(text.unwrap_or_default(), false))
        .collect();
    debug!(
        entries = entries.len(),
        terms = index.len(),
        "linked texts against glossary"
    );
    Ok(annotated)
}

async fn fetch_entries<S: GlossarySource>(source: &S) -> Result<Vec<GlossaryEntry>, GlossaryError> {
    source.fetch_all().await.inspect_err(|err| {
        warn!(error = %err, "failed to fetch glossary entries");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<GlossaryEntry> {
        vec![
            GlossaryEntry::new(0, "foo", "Foo bar baz"),
            GlossaryEntry::new(0, "bar", "Hello Foo bar baz"),
        ]
    }

    fn failing() -> impl GlossarySource {
        from_fn(|| {
            let err = GlossaryError::data_access("connection refused");
            std::future::ready(Err::<Vec<GlossaryEntry>, _>(err))
        })
    }

    #[test]
    fn stem_text_handles_empty_input() {
        assert!(stem_text(&[]).is_empty());
    }

    #[test]
    fn stem_text_keeps_one_stem_per_entry() {
        let entries = entries();
        let stems = stem_text(&entries);
        assert_eq!(stems.len(), 2);
        assert_eq!(stems[0].stem, "foo");
        assert_eq!(stems[1].stem, "bar");
        assert!(std::ptr::eq(stems[1].entry, &entries[1]));
    }

    #[tokio::test]
    async fn missing_text_yields_no_segments() {
        let source = StaticGlossary::new(entries());
        let segments = link_text_from_glossary(&source, None).await.unwrap();
        assert!(segments.is_empty());
    }

    #[tokio::test]
    async fn links_across_pages_by_default() {
        let source = StaticGlossary::new(entries());
        let segments = link_text_from_glossary(&source, Some("Is foo a gall?"))
            .await
            .unwrap();
        assert_eq!(segments.len(), 3);
        match &segments[1] {
            Segment::GlossaryLink(link) => {
                assert!(!link.same_document);
                assert_eq!(link.link().href, "/glossary/#foo");
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_failure_is_propagated() {
        let result = link_text_from_glossary(&failing(), Some("foo")).await;
        assert!(matches!(result, Err(GlossaryError::DataAccess(_))));
    }

    #[tokio::test]
    async fn batch_keeps_input_order() {
        let source = StaticGlossary::new(entries());
        let texts = [Some("bar first"), None, Some("nothing here"), Some("foo")];
        let annotated = link_texts_from_glossary(&source, &texts).await.unwrap();
        assert_eq!(annotated.len(), 4);
        assert_eq!(annotated[0][0].text(), "bar");
        assert!(annotated[1].is_empty());
        assert_eq!(annotated[2], vec![Segment::PlainText("nothing here".to_string())]);
        assert!(annotated[3][0].is_link());
    }

    #[tokio::test]
    async fn batch_fetch_failure_is_propagated() {
        let result = link_texts_from_glossary(&failing(), &[Some("foo")]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn concurrent_calls_do_not_interfere() {
        let source = StaticGlossary::new(entries());
        let (left, right) = tokio::join!(
            link_text_from_glossary(&source, Some("foo only")),
            link_text_from_glossary(&source, Some("only bar")),
        );
        assert_eq!(left.unwrap()[0].text(), "foo");
        assert_eq!(right.unwrap()[1].text(), "bar");
    }
}
