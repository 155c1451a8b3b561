use num_traits::Float;

/// Median of a window by sorting a scratch copy in place.
///
/// `scratch` holds the window contents on entry and is reordered. The result
/// is the middle element of the sorted window, so callers are expected to
/// pass an odd-length window.
#[inline]
pub fn sorted_window_median<F: Float>(scratch: &mut [F]) -> F {
    debug_assert!(!scratch.is_empty());
    scratch.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
    scratch[scratch.len() / 2]
}

#[cfg(test)]
mod tests {
    use super::sorted_window_median;

    #[test]
    fn middle_of_sorted_window() {
        let mut w = [1.0f64, 2.0, 127.0];
        assert_eq!(sorted_window_median(&mut w), 2.0);

        let mut w = [2.0f64, 127.0, 4.0, 5.0, 0.0];
        assert_eq!(sorted_window_median(&mut w), 4.0);
    }

    #[test]
    fn single_element_window() {
        let mut w = [42.0f32];
        assert_eq!(sorted_window_median(&mut w), 42.0);
    }
}
