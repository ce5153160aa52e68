//! Weighted random pick.
//!
//! Every candidate owns a slice of `[1, total]` as wide as its weight, in
//! enumeration order. A uniform roll in that range lands in exactly one
//! slice, so a candidate is picked with probability `weight / total`.

use rand::Rng;

/// picks one item with probability proportional to `weight_of(item)`.
///
/// returns `None` when the slice is empty or every weight is zero.
pub fn pick_weighted<'a, T, R, F>(items: &'a [T], weight_of: F, rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> u64,
{
    let total: u64 = items.iter().map(&weight_of).sum();

    if total == 0 {
        return None;
    }

    let roll = rng.gen_range(1..=total);

    pick_with_roll(items, weight_of, roll)
}

/// the deterministic half of [`pick_weighted`]: walks the running sum of
/// weights and returns the first item whose sum reaches `roll`.
pub fn pick_with_roll<T, F>(items: &[T], weight_of: F, roll: u64) -> Option<&T>
where
    F: Fn(&T) -> u64,
{
    let mut cumulative = 0u64;

    items.iter().find(|item| {
        cumulative += weight_of(*item);
        cumulative >= roll
    })
}
