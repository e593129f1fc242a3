//! Weighted random selection, shared by task drawing and prize drawing.

use rand::Rng;

/// Walk the items accumulating weight and return the first one whose
/// cumulative weight reaches `r`. The last item is a fallback guard for
/// floating-point edge cases at `r == total`.
///
/// Negative weights are treated as zero. A zero-weight item is reachable only
/// when `r` lands exactly on its cumulative boundary.
fn pick_at<'a, T>(items: &'a [T], weight: impl Fn(&T) -> i64, r: f64) -> Option<&'a T> {
    let mut cumulative = 0.0;
    for item in items {
        cumulative += weight(item).max(0) as f64;
        if r <= cumulative {
            return Some(item);
        }
    }
    items.last()
}

/// Pick one item with probability proportional to its weight over the total.
///
/// Returns `None` for an empty sequence or an all-zero total weight; neither
/// is an error at this layer. The random source is injected so callers can
/// seed a deterministic rng in tests.
pub fn weighted_pick<'a, T, R: Rng + ?Sized>(
    items: &'a [T],
    weight: impl Fn(&T) -> i64,
    rng: &mut R,
) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }

    let total: i64 = items.iter().map(|item| weight(item).max(0)).sum();
    if total == 0 {
        return None;
    }

    let r = rng.gen_range(0.0..=total as f64);
    pick_at(items, weight, r)
}
