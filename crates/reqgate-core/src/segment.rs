//! Splits composite Markdown into one block per `ID: XX-NNN` anchor.

use crate::errors::{ReqError, ReqResult};
use crate::requirement::RequirementCorpus;
use regex::Regex;
use std::sync::OnceLock;

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^.*ID:[ \t]*([A-Z]{2}-\d{3})[ \t]*\r?$").expect("static anchor regex")
    })
}

/// Segment `md` into id → trimmed block text.
///
/// A block runs from the start of its anchor line to the start of the next
/// anchor line (or end of text). Text before the first anchor is discarded.
/// A repeated id replaces the earlier block and keeps the earlier position.
pub fn segment_markdown(md: &str) -> ReqResult<RequirementCorpus<String>> {
    let anchors: Vec<(usize, &str)> = anchor_re()
        .captures_iter(md)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let id = c.get(1)?;
            Some((whole.start(), id.as_str()))
        })
        .collect();

    if anchors.is_empty() {
        return Err(ReqError::parse(
            "markdown",
            "no requirement ID anchors found (expected lines like `ID: FR-001`)",
        ));
    }

    let preamble = md[..anchors[0].0].trim();
    if !preamble.is_empty() {
        tracing::debug!(chars = preamble.len(), "discarding text before first requirement anchor");
    }

    let mut corpus = RequirementCorpus::new();
    for (idx, (start, id)) in anchors.iter().enumerate() {
        let end = anchors.get(idx + 1).map(|(s, _)| *s).unwrap_or(md.len());
        let block = md[*start..end].trim().to_string();
        if corpus.insert(*id, block).is_some() {
            tracing::warn!(id = %id, "duplicate requirement id in markdown, last block wins");
        }
    }
    tracing::debug!(count = corpus.len(), "segmented markdown");
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_ws(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn splits_on_anchors_in_first_seen_order() {
        let md = "...\nID: FR-001\nDo X\n\nID: FR-002\nDo Y\n";
        let corpus = segment_markdown(md).unwrap();
        let got: Vec<_> = corpus.iter().collect();
        assert_eq!(
            got,
            vec![
                ("FR-001", &"ID: FR-001\nDo X".to_string()),
                ("FR-002", &"ID: FR-002\nDo Y".to_string()),
            ]
        );
    }

    #[test]
    fn blocks_reconstruct_non_whitespace_content() {
        let md = "## ID: FR-001\nTitle: login\n\n- AC1\n\n## ID: AR-002\nTitle: audit\n  details\n";
        let corpus = segment_markdown(md).unwrap();
        assert_eq!(corpus.len(), 2);
        let joined: String = corpus.values().map(String::as_str).collect();
        assert_eq!(strip_ws(&joined), strip_ws(md));
    }

    #[test]
    fn anchor_may_carry_a_line_prefix() {
        let md = "- **ID: FR-010**\nbody\n";
        // Trailing markup after the id is not an anchor.
        assert!(segment_markdown(md).is_err());

        let md = "### Requirement ID: FR-010\nbody\n";
        let corpus = segment_markdown(md).unwrap();
        assert_eq!(corpus.get("FR-010").unwrap(), "### Requirement ID: FR-010\nbody");
    }

    #[test]
    fn duplicate_id_last_block_wins_first_position_kept() {
        let md = "ID: FR-001\nold\nID: FR-002\nmiddle\nID: FR-001\nnew\n";
        let corpus = segment_markdown(md).unwrap();
        let ids: Vec<_> = corpus.ids().collect();
        assert_eq!(ids, vec!["FR-001", "FR-002"]);
        assert_eq!(corpus.get("FR-001").unwrap(), "ID: FR-001\nnew");
    }

    #[test]
    fn crlf_input_is_accepted() {
        let md = "ID: FR-001\r\nDo X\r\nID: FR-002\r\nDo Y\r\n";
        let corpus = segment_markdown(md).unwrap();
        assert_eq!(corpus.get("FR-001").unwrap(), "ID: FR-001\r\nDo X");
        assert_eq!(corpus.get("FR-002").unwrap(), "ID: FR-002\r\nDo Y");
    }

    #[test]
    fn zero_anchors_is_a_parse_error() {
        let err = segment_markdown("# Requirements\n\nnothing here\n").unwrap_err();
        assert!(matches!(err, ReqError::Parse { .. }));
    }
}
