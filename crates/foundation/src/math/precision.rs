//! Precision policies.
//!
//! Deterministic float ordering for sorting, keys, and tie-breaks.

use core::cmp::Ordering;

/// Total order over `f64` that is stable across platforms.
///
/// NaN sorts after all numbers; -0.0 and 0.0 compare equal through the
/// `total_cmp` bit ordering, which is what we want for pick tie-breaks.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}
