//! Conflict resolution over concatenated detector output.
//!
//! Sources disagree on span boundaries, category, and confidence. This
//! module reduces their combined findings to an overlap-free subset with a
//! deterministic winner rule:
//!
//! - overlap means positive-length span intersection; touching and
//!   zero-length spans never conflict
//! - between two overlapping findings, higher category priority wins, then
//!   higher confidence, then the earlier position in the canonical order
//! - a finding survives only if no other finding in the whole input defeats
//!   it, so the result is independent of the order detectors were invoked
//!
//! The sweep below visits only pairs whose spans can still intersect, but
//! the semantics stay all-pairs: defeat is assessed against the entire
//! candidate set, not just previously accepted survivors.

use std::cmp::Ordering;

use shared_types::{Category, Finding};

/// Reduce `findings` to the overlap-free subset, sorted ascending by span
/// start.
pub fn resolve(mut findings: Vec<Finding>) -> Vec<Finding> {
    findings.sort_by(canonical_order);

    let mut defeated = vec![false; findings.len()];
    for i in 0..findings.len() {
        for j in (i + 1)..findings.len() {
            // Sorted by start: once `j` begins at or past the end of `i`,
            // nothing later can overlap `i`.
            if findings[j].span.start >= findings[i].span.end {
                break;
            }
            if !findings[i].span.overlaps(&findings[j].span) {
                continue;
            }
            match duel(&findings[i], &findings[j]) {
                Ordering::Greater => defeated[j] = true,
                Ordering::Less => defeated[i] = true,
                // Full tie: the finding earlier in canonical order survives.
                Ordering::Equal => defeated[j] = true,
            }
        }
    }

    findings
        .into_iter()
        .zip(defeated)
        .filter_map(|(finding, dead)| (!dead).then_some(finding))
        .collect()
}

/// Winner rule between two overlapping findings: category priority first,
/// then confidence. `Equal` is a genuine tie with no winner by value.
fn duel(a: &Finding, b: &Finding) -> Ordering {
    a.category
        .priority()
        .cmp(&b.category.priority())
        .then_with(|| {
            a.confidence
                .partial_cmp(&b.confidence)
                .unwrap_or(Ordering::Equal)
        })
}

/// Canonical processing order: span start ascending, category priority
/// descending, confidence descending. The trailing keys extend this to a
/// total order over finding values, which makes the tie-break a function of
/// the input multiset rather than of the incoming list order.
fn canonical_order(a: &Finding, b: &Finding) -> Ordering {
    a.span
        .start
        .cmp(&b.span.start)
        .then_with(|| b.category.priority().cmp(&a.category.priority()))
        .then_with(|| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.span.end.cmp(&b.span.end))
        .then_with(|| category_ordinal(a.category).cmp(&category_ordinal(b.category)))
        .then_with(|| a.message.cmp(&b.message))
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.suggestions.cmp(&b.suggestions))
}

fn category_ordinal(category: Category) -> u8 {
    match category {
        Category::Spelling => 0,
        Category::Grammar => 1,
        Category::Agreement => 2,
        Category::Punctuation => 3,
        Category::Style => 4,
    }
}
