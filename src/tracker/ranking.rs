//! Ordering peers from most to least reliably responsive.
//!
//! Peers are compared on two axes: how many replies they answered within the retention window
//! (more is better) and their average latency over that window (lower is better). When one peer is
//! at least as good on both axes it dominates the other. When the axes disagree, the
//! [tolerances](Tolerances) decide whether the advantage on one axis is large enough to outweigh
//! the disadvantage on the other.
//!
//! This relation is **not transitive**: three peers can each rank ahead of the next one in a cycle.
//! [rank] therefore does not hand it to a general purpose sort, which may misbehave on inconsistent
//! comparators, but runs its own stable insertion sort that follows [compare] while guaranteeing that
//! a dominating peer always ends up ahead of the peers it dominates, and that peers with no sample
//! in the window always end up last.

use std::{cmp::Ordering, time::Duration};

use super::PeerSummary;
use crate::config::Tolerances;

/// The `(sample count, average latency)` pair of a peer that has at least one retained sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Score {
    pub success_count: usize,
    pub average_latency: Duration,
}

impl Score {
    pub fn of(summary: &PeerSummary) -> Option<Self> {
        summary.average_latency.map(|average_latency| Score {
            success_count: summary.sample_count,
            average_latency,
        })
    }

    /// `self` is at least as good as `other` on both axes and strictly better on one
    pub fn dominates(&self, other: &Score) -> bool {
        self.success_count >= other.success_count
            && self.average_latency <= other.average_latency
            && self != other
    }
}

/// Returns true when `a` ranks ahead of, or equally with, `b`.
pub fn before(a: &Score, b: &Score, tolerances: &Tolerances) -> bool {
    let (a_count, b_count) = (a.success_count, b.success_count);
    let (a_latency, b_latency) = (a.average_latency, b.average_latency);

    if a_count >= b_count && a_latency <= b_latency {
        true
    } else if a_count <= b_count && a_latency >= b_latency {
        false
    } else if a_count <= b_count && a_latency <= b_latency {
        // a is faster but less reliable
        b_count - a_count < tolerances.success_count
    } else {
        // a is more reliable but slower
        a_latency - b_latency < tolerances.latency
    }
}

/// Orders two summaries best-first.
///
/// Peers without retained samples rank after every peer that has some. Otherwise, when [before]
/// holds in exactly one direction it decides. When it holds both ways, each peer's disadvantage
/// is within tolerance and the two are equal. When it holds in neither, each peer's advantage
/// is significant and the more reliable one ranks first.
pub fn compare(a: &PeerSummary, b: &PeerSummary, tolerances: &Tolerances) -> Ordering {
    match (Score::of(a), Score::of(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (before(&a, &b, tolerances), before(&b, &a, tolerances)) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (true, true) => Ordering::Equal,
            (false, false) => b.success_count.cmp(&a.success_count),
        },
    }
}

/// `a` has to be placed ahead of `b` whatever the comparator says
fn must_precede(a: &PeerSummary, b: &PeerSummary) -> bool {
    match (Score::of(a), Score::of(b)) {
        (Some(_), None) => true,
        (Some(a), Some(b)) => a.dominates(&b),
        _ => false,
    }
}

/// Sorts `summaries` best-first, in place.
///
/// Each summary is inserted, in its current order, into the already ranked prefix: it moves towards
/// the front while [compare] puts it strictly ahead of its predecessor, but never past a peer that
/// must precede it, and always past a peer it must precede. Because "must precede" is a partial
/// order, both bounds are always compatible. Equal peers keep their relative order.
pub fn rank(summaries: &mut [PeerSummary], tolerances: &Tolerances) {
    for i in 1..summaries.len() {
        let (ranked, rest) = summaries.split_at(i);
        let candidate = &rest[0];

        let lower_bound = ranked
            .iter()
            .rposition(|r| must_precede(r, candidate))
            .map(|pos| pos + 1)
            .unwrap_or(0);
        let upper_bound = ranked
            .iter()
            .position(|r| must_precede(candidate, r))
            .unwrap_or(i);
        debug_assert!(lower_bound <= upper_bound);

        let mut position = i;
        while position > lower_bound
            && (position > upper_bound
                || compare(candidate, &ranked[position - 1], tolerances) == Ordering::Less)
        {
            position -= 1;
        }
        summaries[position..=i].rotate_right(1);
    }
}
