//! Match span utilities: character-to-byte reconciliation and normalization.
//!
//! Search backends report match positions in different units. Elasticsearch counts Unicode
//! scalar values, while Tantivy tokenizers report byte offsets. Everything downstream of this
//! module works in byte offsets into the stored UTF-8 content.

use std::{
    collections::{HashMap, HashSet},
    ops::Range,
};

/// Converts character-ordinal spans into byte-offset spans over `content`.
///
/// A character ordinal `n` maps to the byte offset at which the `n`th character begins. The
/// ordinal equal to the total character count maps to `content.len()`, so a match that ends at
/// the end of the file survives. Spans with either boundary beyond that are dropped. The
/// relative order of the surviving spans is preserved.
pub fn char_to_byte_spans(content: &str, spans: &[Range<usize>]) -> Vec<Range<usize>> {
    let wanted: HashSet<usize> = spans
        .iter()
        .flat_map(|span| [span.start, span.end])
        .collect();
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut boundaries: HashMap<usize, usize> = HashMap::with_capacity(wanted.len());
    let mut total = 0;
    for (ordinal, (byte, _)) in content.char_indices().enumerate() {
        if wanted.contains(&ordinal) {
            boundaries.insert(ordinal, byte);
            if boundaries.len() == wanted.len() {
                break;
            }
        }
        total = ordinal + 1;
    }
    if boundaries.len() < wanted.len() && wanted.contains(&total) {
        boundaries.insert(total, content.len());
    }

    spans
        .iter()
        .filter_map(|span| {
            let start = boundaries.get(&span.start)?;
            let end = boundaries.get(&span.end)?;
            Some(*start..*end)
        })
        .collect()
}

/// Merges byte ranges, combining overlapping or adjacent ranges.
///
/// The result is sorted by start position with no overlaps.
pub fn merge_ranges(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    if ranges.is_empty() {
        return ranges;
    }

    ranges.sort_by_key(|r| r.start);

    let mut merged = Vec::with_capacity(ranges.len());
    let mut current = ranges[0].clone();

    for range in ranges.into_iter().skip(1) {
        if range.start <= current.end {
            current.end = current.end.max(range.end);
        } else {
            merged.push(current);
            current = range;
        }
    }
    merged.push(current);

    merged
}

/// Keeps only the spans that can be rendered against `content`, sorted and merged.
///
/// A usable span is non-empty, lies within the content, and starts and ends on UTF-8 character
/// boundaries.
pub fn usable_spans(content: &str, spans: &[Range<usize>]) -> Vec<Range<usize>> {
    let valid = spans
        .iter()
        .filter(|span| {
            span.start < span.end
                && content.is_char_boundary(span.start)
                && content.is_char_boundary(span.end)
        })
        .cloned()
        .collect();
    merge_ranges(valid)
}
