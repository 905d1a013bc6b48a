//! Incremental stream merging.

use std::collections::BTreeMap;

use crate::series::CoordinateSeries;

/// Fold a freshly fetched series into the one already held.
///
/// - A shorter incoming series means the stream restarted; it is adopted
///   wholesale.
/// - An equal-length incoming series leaves the previous one untouched, so
///   downstream consumers can skip recomputation.
/// - A longer incoming series extends the previous one with its tail across
///   every parallel array, preserving alignment.
///
/// Metadata columns: on append, columns present in both series keep the
/// previous prefix and gain the incoming tail; columns the incoming series
/// introduced are adopted in full; columns the incoming series no longer
/// carries are dropped rather than left misaligned.
pub fn merge(previous: &CoordinateSeries, incoming: &CoordinateSeries) -> CoordinateSeries {
    let prev_len = previous.len();
    let inc_len = incoming.len();

    if inc_len < prev_len {
        // stream reset
        return incoming.clone();
    }
    if inc_len == prev_len {
        return previous.clone();
    }

    let mut xs = previous.xs().to_vec();
    xs.extend_from_slice(&incoming.xs()[prev_len..]);
    let mut ys = previous.ys().to_vec();
    ys.extend_from_slice(&incoming.ys()[prev_len..]);

    let mut meta = BTreeMap::new();
    for (name, column) in incoming.meta() {
        let merged = match previous.meta_column(name) {
            Some(prefix) => {
                let mut out = prefix.to_vec();
                out.extend_from_slice(&column[prev_len..]);
                out
            }
            None => column.clone(),
        };
        meta.insert(name.clone(), merged);
    }

    CoordinateSeries::from_parts(xs, ys, meta)
        .expect("merged arrays share the incoming length")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn series(xs: &[f64]) -> CoordinateSeries {
        let ys: Vec<f64> = xs.iter().map(|x| x * 10.0).collect();
        CoordinateSeries::from_xy(xs.to_vec(), ys).unwrap()
    }

    #[test]
    fn equal_length_returns_previous_unchanged() {
        let prev = series(&[1.0, 2.0, 3.0]);
        let merged = merge(&prev, &series(&[1.0, 2.0, 3.0]));
        assert_eq!(merged, prev);
    }

    #[test]
    fn shorter_incoming_is_a_reset() {
        let prev = series(&[1.0, 2.0, 3.0]);
        let incoming = series(&[9.0]);
        assert_eq!(merge(&prev, &incoming), incoming);
    }

    #[test]
    fn longer_incoming_appends_tail_only() {
        let prev = series(&[1.0, 2.0]);
        let incoming = series(&[1.5, 2.5, 3.0, 4.0]);
        let merged = merge(&prev, &incoming);

        // the held prefix wins over the incoming one
        assert_eq!(merged.xs(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(merged.ys(), &[10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn shared_meta_columns_extend() {
        let mut prev_meta = BTreeMap::new();
        prev_meta.insert("temp".to_string(), vec![20.0, 21.0]);
        let prev =
            CoordinateSeries::from_parts(vec![1.0, 2.0], vec![1.0, 2.0], prev_meta).unwrap();

        let mut inc_meta = BTreeMap::new();
        inc_meta.insert("temp".to_string(), vec![99.0, 99.0, 22.0]);
        let incoming =
            CoordinateSeries::from_parts(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0], inc_meta)
                .unwrap();

        let merged = merge(&prev, &incoming);
        assert_eq!(merged.meta_column("temp"), Some(&[20.0, 21.0, 22.0][..]));
    }

    #[test]
    fn new_meta_columns_are_adopted_and_stale_ones_dropped() {
        let mut prev_meta = BTreeMap::new();
        prev_meta.insert("old".to_string(), vec![1.0]);
        let prev = CoordinateSeries::from_parts(vec![1.0], vec![1.0], prev_meta).unwrap();

        let mut inc_meta = BTreeMap::new();
        inc_meta.insert("new".to_string(), vec![5.0, 6.0]);
        let incoming =
            CoordinateSeries::from_parts(vec![1.0, 2.0], vec![1.0, 2.0], inc_meta).unwrap();

        let merged = merge(&prev, &incoming);
        assert_eq!(merged.meta_column("new"), Some(&[5.0, 6.0][..]));
        assert_eq!(merged.meta_column("old"), None);
        assert_eq!(merged.len(), 2);
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(xs in prop::collection::vec(-1e6..1e6f64, 0..64)) {
            let s = series(&xs);
            prop_assert_eq!(merge(&s, &s), s);
        }

        #[test]
        fn monotonic_append_equals_incoming(
            xs in prop::collection::vec(-1e6..1e6f64, 1..64),
            split in 0usize..64,
        ) {
            let split = split.min(xs.len());
            let prev = series(&xs[..split]);
            let incoming = series(&xs);
            prop_assert_eq!(merge(&prev, &incoming), incoming);
        }

        #[test]
        fn reset_returns_incoming_exactly(
            prev_xs in prop::collection::vec(-1e6..1e6f64, 2..64),
            inc_len in 0usize..2,
        ) {
            let prev = series(&prev_xs);
            let incoming = series(&prev_xs[..inc_len]);
            prop_assert_eq!(merge(&prev, &incoming), incoming);
        }

        #[test]
        fn merged_length_tracks_incoming(
            prev_xs in prop::collection::vec(-1e6..1e6f64, 0..32),
            inc_xs in prop::collection::vec(-1e6..1e6f64, 0..32),
        ) {
            let merged = merge(&series(&prev_xs), &series(&inc_xs));
            prop_assert_eq!(merged.len(), inc_xs.len());
        }
    }
}
