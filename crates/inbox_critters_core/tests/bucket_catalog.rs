use inbox_critters_core::{Bucket, BucketCounts};
use std::collections::HashSet;

#[test]
fn catalog_has_four_buckets_in_canonical_order() {
    let order: Vec<Bucket> = Bucket::iter().collect();
    assert_eq!(
        order,
        vec![
            Bucket::MostImportant,
            Bucket::High,
            Bucket::Normal,
            Bucket::Someday
        ]
    );

    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(sorted, order);
}

#[test]
fn every_bucket_has_unique_icon_and_label() {
    let icons: HashSet<_> = Bucket::iter().map(Bucket::icon).collect();
    let labels: HashSet<_> = Bucket::iter().map(Bucket::label).collect();

    assert_eq!(icons.len(), Bucket::ALL.len());
    assert_eq!(labels.len(), Bucket::ALL.len());
    assert!(Bucket::iter().all(|bucket| !bucket.label().is_empty()));
    assert!(Bucket::iter().all(|bucket| !bucket.icon().is_empty()));
}

#[test]
fn colors_stay_in_unit_range() {
    for bucket in Bucket::iter() {
        let color = bucket.color();
        for component in [color.r, color.g, color.b] {
            assert!((0.0..=1.0).contains(&component), "{bucket}: {component}");
        }
    }
}

#[test]
fn bucket_serialization_uses_storage_keys() {
    for bucket in Bucket::iter() {
        let json = serde_json::to_value(bucket).unwrap();
        assert_eq!(json, bucket.as_key());
        assert_eq!(Bucket::from_key(bucket.as_key()), Some(bucket));
    }
}

#[test]
fn bucket_counts_iterate_in_canonical_order() {
    let mut counts = BucketCounts::default();
    counts.increment(Bucket::Someday);
    counts.increment(Bucket::MostImportant);

    let pairs: Vec<_> = counts.iter().collect();
    assert_eq!(
        pairs,
        vec![
            (Bucket::MostImportant, 1),
            (Bucket::High, 0),
            (Bucket::Normal, 0),
            (Bucket::Someday, 1)
        ]
    );
}
