//! Tag cloud sizing
//!
//! Scales each tag's font size linearly between `min_size` and `max_size`
//! according to where its usage count falls between the least and the most
//! used tag of the set.

use crate::models::{SizedTag, TagWithCount};

/// Attach a font size to every tag
///
/// `size = floor(min_size + (cnt - min_count) * (max_size - min_size) / spread)`
/// with `spread = max_count - min_count`, or 1 when all counts are equal.
/// Sizes never go below 0. An empty input gives an empty output.
pub fn compute_sizes(tags: Vec<TagWithCount>, min_size: i64, max_size: i64) -> Vec<SizedTag> {
    let (min_count, max_count) = match count_range(&tags) {
        Some(range) => range,
        None => return Vec::new(),
    };

    let spread = match i128::from(max_count) - i128::from(min_count) {
        0 => 1,
        spread => spread,
    };
    let size_range = i128::from(max_size) - i128::from(min_size);

    tags.into_iter()
        .map(|TagWithCount { tag, cnt }| {
            let offset = (i128::from(cnt) - i128::from(min_count)) * size_range;
            let size = i128::from(min_size) + offset.div_euclid(spread);
            SizedTag {
                tag,
                cnt,
                size: size.clamp(0, i128::from(i64::MAX)) as i64,
            }
        })
        .collect()
}

fn count_range(tags: &[TagWithCount]) -> Option<(i64, i64)> {
    let min = tags.iter().map(|t| t.cnt).min()?;
    let max = tags.iter().map(|t| t.cnt).max()?;
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tag;
    use chrono::Utc;

    fn tags(counts: &[i64]) -> Vec<TagWithCount> {
        counts
            .iter()
            .enumerate()
            .map(|(i, cnt)| {
                let tag = Tag {
                    id: i as i64 + 1,
                    slug: format!("tag-{}", i),
                    name: format!("Tag {}", i),
                    created_at: Utc::now(),
                };
                TagWithCount::new(tag, *cnt)
            })
            .collect()
    }

    fn sizes(counts: &[i64], min_size: i64, max_size: i64) -> Vec<i64> {
        compute_sizes(tags(counts), min_size, max_size)
            .into_iter()
            .map(|t| t.size)
            .collect()
    }

    #[test]
    fn test_linear_scaling() {
        assert_eq!(sizes(&[10, 20, 30], 100, 200), vec![100, 150, 200]);
    }

    #[test]
    fn test_single_tag_gets_min_size() {
        assert_eq!(sizes(&[5], 80, 240), vec![80]);
    }

    #[test]
    fn test_empty_input() {
        assert!(compute_sizes(Vec::new(), 100, 200).is_empty());
    }

    #[test]
    fn test_default_sizes_are_uniform() {
        assert_eq!(sizes(&[1, 7, 30], 100, 100), vec![100, 100, 100]);
    }

    #[test]
    fn test_sizes_are_floored() {
        // 100 + 1 * 100 / 3 = 133.33
        assert_eq!(sizes(&[0, 1, 3], 100, 200), vec![100, 133, 200]);
    }

    #[test]
    fn test_inverted_range_floors_towards_negative() {
        // 200 + 1 * -100 / 3 = 166.67
        assert_eq!(sizes(&[0, 1, 3], 200, 100), vec![200, 166, 100]);
    }

    #[test]
    fn test_negative_sizes_clamp_to_zero() {
        assert_eq!(sizes(&[1, 2], -50, 10), vec![0, 10]);
    }

    #[test]
    fn test_keeps_order_and_counts() {
        let sized = compute_sizes(tags(&[30, 10, 20]), 100, 200);

        let summary: Vec<(i64, i64, i64)> = sized.iter().map(|t| (t.tag.id, t.cnt, t.size)).collect();
        assert_eq!(summary, vec![(1, 30, 200), (2, 10, 100), (3, 20, 150)]);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            /// Equal counts give every tag the minimum size
            #[test]
            fn uniform_counts_give_min_size(
                cnt in 0i64..10_000,
                n in 1usize..20,
                min_size in 0i64..500,
                max_size in 0i64..500,
            ) {
                let result = sizes(&vec![cnt; n], min_size, max_size);
                prop_assert!(result.iter().all(|s| *s == min_size));
            }

            /// A larger count never gets a smaller size
            #[test]
            fn sizes_are_monotonic(
                counts in prop::collection::vec(0i64..10_000, 1..30),
                min_size in 0i64..300,
                extra in 0i64..300,
            ) {
                let max_size = min_size + extra;
                let sized = compute_sizes(tags(&counts), min_size, max_size);
                for a in &sized {
                    for b in &sized {
                        if a.cnt <= b.cnt {
                            prop_assert!(a.size <= b.size);
                        }
                    }
                }
            }

            /// Sizes stay between the configured bounds
            #[test]
            fn sizes_stay_in_bounds(
                counts in prop::collection::vec(0i64..10_000, 1..30),
                min_size in 0i64..300,
                extra in 0i64..300,
            ) {
                let max_size = min_size + extra;
                for size in sizes(&counts, min_size, max_size) {
                    prop_assert!(size >= min_size && size <= max_size);
                }
            }

            /// Output has one entry per input tag
            #[test]
            fn one_size_per_tag(counts in prop::collection::vec(0i64..100, 0..30)) {
                prop_assert_eq!(sizes(&counts, 100, 200).len(), counts.len());
            }
        }
    }
}
