//! Path simplification

/// Stride that keeps a sequence of `len` points within `max_points`.
///
/// `max_points == 0` means no limit.
pub fn stride_for(len: usize, max_points: usize) -> usize {
    if max_points == 0 {
        return 1;
    }
    len.div_ceil(max_points).max(1)
}

/// Every `stride_for(len, max_points)`-th item, starting with the first
pub fn downsample<T: Copy>(items: &[T], max_points: usize) -> Vec<T> {
    let stride = stride_for(items.len(), max_points);
    items.iter().step_by(stride).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride() {
        assert_eq!(stride_for(0, 3000), 1);
        assert_eq!(stride_for(3000, 3000), 1);
        assert_eq!(stride_for(3001, 3000), 2);
        assert_eq!(stride_for(5999, 3000), 2);
        assert_eq!(stride_for(9001, 3000), 4);
        assert_eq!(stride_for(10, 0), 1);
    }

    #[test]
    fn test_downsample_never_exceeds_budget() {
        for len in 0..200usize {
            let items: Vec<usize> = (0..len).collect();
            for max in 1..20usize {
                let out = downsample(&items, max);
                assert!(out.len() <= max, "len={len} max={max} got {}", out.len());
                if len > 0 {
                    assert_eq!(out[0], 0);
                }
            }
        }
    }

    #[test]
    fn test_downsample_keeps_short_sequences() {
        let items = [1, 2, 3];
        assert_eq!(downsample(&items, 3000), vec![1, 2, 3]);
    }
}
