//! Folding flat per-bit results back into per-element answers.
//!
//! A batch of `e` elements produces `e * k` bit results, laid out element by
//! element. Each window of `k` consecutive results belongs to one element,
//! and windows are folded in input order.

/// `bits[i]` is the prior value of the i-th bit set. An element counts as
/// added when at least one of its bits was previously clear.
pub fn reduce_added(bits: &[bool], hashes: u32) -> Vec<bool> {
    windows(bits, hashes)
        .map(|window| window.iter().any(|&was_set| !was_set))
        .collect()
}

/// `bits[i]` is the current value of the i-th bit read. An element is
/// present when every one of its bits is set.
pub fn reduce_contained(bits: &[bool], hashes: u32) -> Vec<bool> {
    windows(bits, hashes)
        .map(|window| window.iter().all(|&is_set| is_set))
        .collect()
}

fn windows(bits: &[bool], hashes: u32) -> std::slice::ChunksExact<'_, bool> {
    bits.chunks_exact((hashes as usize).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(reduce_added(&[], 3).is_empty());
        assert!(reduce_contained(&[], 3).is_empty());
    }

    #[test]
    fn test_added_windows() {
        let bits = [true, true, true, true, false, true];
        assert_eq!(reduce_added(&bits, 3), vec![false, true]);
    }

    #[test]
    fn test_contained_windows() {
        let bits = [true, true, false, true, true, true];
        assert_eq!(reduce_contained(&bits, 3), vec![false, true]);
    }

    #[test]
    fn test_batch_fold_matches_per_element_fold() {
        let k = 4;
        let elements: Vec<Vec<bool>> = (0..16u32)
            .map(|mask| (0..k).map(|bit| mask & (1 << bit) != 0).collect())
            .collect();
        let flat: Vec<bool> = elements.iter().flatten().copied().collect();

        let added: Vec<bool> =
            elements.iter().map(|e| reduce_added(e, k)[0]).collect();
        let contained: Vec<bool> =
            elements.iter().map(|e| reduce_contained(e, k)[0]).collect();

        assert_eq!(reduce_added(&flat, k), added);
        assert_eq!(reduce_contained(&flat, k), contained);
        assert_eq!(contained.iter().filter(|&&c| c).count(), 1);
        assert_eq!(added.iter().filter(|&&a| !a).count(), 1);
    }
}
