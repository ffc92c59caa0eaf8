use junevec::{fnv1a, ArenaAllocator, BucketSet, JuneError, DEFAULT_ALLOCATOR};

fn hash_u32(value: &u32) -> u64 {
    fnv1a(&value.to_le_bytes())
}

#[test]
fn test_add_is_idempotent() {
    let mut set = BucketSet::new_in(8, hash_u32, &DEFAULT_ALLOCATOR).unwrap();

    assert_eq!(set.add(42), Ok(true));
    assert_eq!(set.add(42), Ok(false));
    assert_eq!(set.len(), 1);
    assert!(set.contains(&42));
}

#[test]
fn test_remove_absent_returns_false() {
    let mut set = BucketSet::new_in(8, hash_u32, &DEFAULT_ALLOCATOR).unwrap();
    set.add(1).unwrap();

    assert!(!set.remove(&2));
    assert_eq!(set.len(), 1);

    assert!(set.remove(&1));
    assert!(!set.remove(&1));
    assert!(set.is_empty());
}

#[test]
fn test_bucket_count_is_fixed() {
    let mut set = BucketSet::new_in(4, hash_u32, &DEFAULT_ALLOCATOR).unwrap();
    for v in 0..1000 {
        set.add(v).unwrap();
    }

    assert_eq!(set.bucket_count(), 4);
    assert_eq!(set.len(), 1000);
    let total: usize = (0..4).map(|i| set.bucket_len(i).unwrap()).sum();
    assert_eq!(total, 1000);
}

#[test]
fn test_load_factor() {
    let mut set = BucketSet::new_in(4, hash_u32, &DEFAULT_ALLOCATOR).unwrap();
    assert!(set.load_factor().abs() < f64::EPSILON);

    for v in 0..10 {
        set.add(v).unwrap();
    }

    assert!((set.load_factor() - 2.5).abs() < f64::EPSILON);
}

#[test]
fn test_iter_visits_every_element_once() {
    let mut set = BucketSet::new_in(16, hash_u32, &DEFAULT_ALLOCATOR).unwrap();
    for v in 0..100 {
        set.add(v * 3).unwrap();
    }

    let iter = set.iter();
    assert_eq!(iter.len(), 100);

    let mut seen: Vec<u32> = iter.copied().collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..100).map(|v| v * 3).collect::<Vec<_>>());
}

#[test]
fn test_iter_clone_is_independent() {
    let mut set = BucketSet::new_in(2, hash_u32, &DEFAULT_ALLOCATOR).unwrap();
    for v in 0..5 {
        set.add(v).unwrap();
    }

    let mut iter = set.iter();
    iter.next();
    let rest = iter.clone();

    assert_eq!(iter.count(), 4);
    assert_eq!(rest.len(), 4);
}

#[test]
fn test_clear_keeps_buckets() {
    let mut set = BucketSet::new_in(3, hash_u32, &DEFAULT_ALLOCATOR).unwrap();
    for v in 0..30 {
        set.add(v).unwrap();
    }

    set.clear();

    assert!(set.is_empty());
    assert_eq!(set.bucket_count(), 3);
    assert_eq!(set.iter().next(), None);
    assert!(!set.contains(&5));
}

#[test]
fn test_string_elements() {
    let mut set = BucketSet::new_in(8, |s: &&str| fnv1a(s.as_bytes()), &DEFAULT_ALLOCATOR).unwrap();

    set.add("apple").unwrap();
    set.add("pear").unwrap();
    set.add("apple").unwrap();

    assert_eq!(set.len(), 2);
    assert!(set.contains(&"pear"));
    assert!(!set.contains(&"plum"));
}

#[test]
fn test_debug_lists_elements() {
    let mut set = BucketSet::new_in(1, hash_u32, &DEFAULT_ALLOCATOR).unwrap();
    set.add(1).unwrap();
    set.add(2).unwrap();

    assert_eq!(format!("{set:?}"), "{1, 2}");
}

#[test]
fn test_zero_buckets_rejected() {
    let result = BucketSet::new_in(0, hash_u32, &DEFAULT_ALLOCATOR);

    assert!(matches!(
        result,
        Err(JuneError::InvalidConfiguration {
            parameter: "bucket_count",
            ..
        })
    ));
}

#[test]
fn test_set_in_arena() {
    let arena = ArenaAllocator::new(4096, &DEFAULT_ALLOCATOR).unwrap();
    let mut set = BucketSet::new_in(4, hash_u32, &arena).unwrap();

    for v in 0..50 {
        set.add(v).unwrap();
    }

    assert_eq!(set.len(), 50);
    assert!(arena.used() > 0);
    assert!((0..50).all(|v| set.contains(&v)));
}
