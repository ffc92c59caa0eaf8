use std::collections::{HashSet, VecDeque};

use junevec::{fnv1a, BucketSet, GrowBuf, JuneString, DEFAULT_ALLOCATOR};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum DequeOp {
    PushBack(i32),
    PushFront(i32),
    PopBack,
    PopFront,
    Erase(usize),
    Clear,
    Shrink,
}

fn deque_op() -> impl Strategy<Value = DequeOp> {
    prop_oneof![
        4 => any::<i32>().prop_map(DequeOp::PushBack),
        4 => any::<i32>().prop_map(DequeOp::PushFront),
        2 => Just(DequeOp::PopBack),
        2 => Just(DequeOp::PopFront),
        1 => (0usize..64).prop_map(DequeOp::Erase),
        1 => Just(DequeOp::Clear),
        1 => Just(DequeOp::Shrink),
    ]
}

fn hash_u16(value: &u16) -> u64 {
    fnv1a(&value.to_le_bytes())
}

proptest! {
    #[test]
    fn stack_pops_in_reverse_push_order(values in proptest::collection::vec(any::<i64>(), 0..200)) {
        let mut buf: GrowBuf<'_, i64> = GrowBuf::new_in(&DEFAULT_ALLOCATOR).unwrap();
        for v in &values {
            buf.push_back(*v).unwrap();
        }

        for v in values.iter().rev() {
            prop_assert_eq!(buf.pop_back(), Some(*v));
        }
        prop_assert_eq!(buf.pop_back(), None);
    }

    #[test]
    fn deque_matches_vecdeque(ops in proptest::collection::vec(deque_op(), 0..300)) {
        let mut buf: GrowBuf<'_, i32> = GrowBuf::new_in(&DEFAULT_ALLOCATOR).unwrap();
        let mut model: VecDeque<i32> = VecDeque::new();

        for op in ops {
            match op {
                DequeOp::PushBack(v) => {
                    buf.push_back(v).unwrap();
                    model.push_back(v);
                }
                DequeOp::PushFront(v) => {
                    buf.push_front(v).unwrap();
                    model.push_front(v);
                }
                DequeOp::PopBack => prop_assert_eq!(buf.pop_back(), model.pop_back()),
                DequeOp::PopFront => prop_assert_eq!(buf.pop_front(), model.pop_front()),
                DequeOp::Erase(index) => {
                    prop_assert_eq!(buf.erase(index).ok(), model.remove(index));
                }
                DequeOp::Clear => {
                    buf.clear();
                    model.clear();
                }
                DequeOp::Shrink => {
                    buf.shrink_to_fit().unwrap();
                    prop_assert_eq!(buf.capacity(), buf.len());
                }
            }

            prop_assert!(buf.len() <= buf.capacity());
            prop_assert_eq!(buf.front_slack() + buf.len() + buf.back_slack(), buf.capacity());
            prop_assert!(buf.iter().eq(model.iter()));
        }
    }

    #[test]
    fn reserve_guarantees_capacity(
        initial in proptest::collection::vec(any::<u8>(), 0..32),
        min in 0usize..4096,
    ) {
        let mut buf: GrowBuf<'_, u8> = GrowBuf::new_in(&DEFAULT_ALLOCATOR).unwrap();
        buf.extend_from_slice(&initial).unwrap();

        buf.reserve(min).unwrap();

        prop_assert!(buf.capacity() >= min);
        prop_assert_eq!(buf.as_slice(), initial.as_slice());
    }

    #[test]
    fn string_always_ends_in_terminator(
        chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..20), 0..20),
        pops in 0usize..40,
    ) {
        let mut s = JuneString::new_in(&DEFAULT_ALLOCATOR).unwrap();
        let mut model: Vec<u8> = Vec::new();

        for chunk in &chunks {
            s.push_bytes(chunk).unwrap();
            model.extend_from_slice(chunk);
            prop_assert_eq!(s.as_bytes_with_nul().last(), Some(&0));
        }
        for _ in 0..pops {
            prop_assert_eq!(s.pop_back(), model.pop());
            prop_assert_eq!(s.as_bytes_with_nul().last(), Some(&0));
        }

        prop_assert_eq!(s.len(), model.len());
        prop_assert_eq!(s.as_bytes(), model.as_slice());
    }

    #[test]
    fn substrings_concatenate_back_to_original(text in "[a-z ]{2,40}", split in 1usize..40) {
        let s = JuneString::from_str_in(&text, &DEFAULT_ALLOCATOR).unwrap();
        let split = split.min(s.len() - 1);

        let left = s.substring(0, split).unwrap();
        let right = s.substring(split, s.len()).unwrap();

        prop_assert_eq!(left.concatenate(&right).unwrap(), s);
    }

    #[test]
    fn bucket_set_matches_hashset(
        adds in proptest::collection::vec(any::<u16>(), 0..200),
        removes in proptest::collection::vec(any::<u16>(), 0..100),
        bucket_count in 1usize..32,
    ) {
        let mut set = BucketSet::new_in(bucket_count, hash_u16, &DEFAULT_ALLOCATOR).unwrap();
        let mut model: HashSet<u16> = HashSet::new();

        for v in &adds {
            prop_assert_eq!(set.add(*v).unwrap(), model.insert(*v));
        }
        for v in &removes {
            prop_assert_eq!(set.remove(v), model.remove(v));
        }

        prop_assert_eq!(set.len(), model.len());
        prop_assert_eq!(set.bucket_count(), bucket_count);
        prop_assert_eq!(set.iter().copied().collect::<HashSet<_>>(), model);
    }
}
