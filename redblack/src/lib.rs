#![warn(missing_docs)]
#![doc = include_str!("../../README.md")]

mod error;
mod rbtree;
#[cfg(feature = "sync")]
pub mod sync;

pub use error::{DuplicateKey, NotFound};
pub use rbtree::{
    InOrder, LevelOrder, Order, PostOrder, PreOrder, Rbtree, RbtreeGeneric, Traversal,
};

#[cfg(test)]
mod tests {
    use rand::prelude::SliceRandom;
    use rand::seq::IteratorRandom;

    use crate::{DuplicateKey, NotFound, Rbtree, RbtreeGeneric};

    #[test]
    fn empty() {
        let mut rb = Rbtree::<i32>::default();

        assert_eq!(rb.size(), 0);
        assert!(rb.is_empty());
        assert_eq!(rb.first(), None);
        assert_eq!(rb.last(), None);
        assert!(!rb.contains(&0));
        assert_eq!(rb.in_order().next(), None);
        assert_eq!(rb.delete(&0), Err(NotFound));
        assert_eq!(rb.size(), 0);
        rb.verify();
    }

    #[test]
    fn traversal_orders() {
        let mut rb = Rbtree::default();
        for i in [10, 5, 15] {
            assert_eq!(rb.insert(i), Ok(()));
        }

        assert_eq!(rb.in_order().copied().collect::<Vec<_>>(), [5, 10, 15]);
        assert_eq!(rb.pre_order().copied().collect::<Vec<_>>(), [10, 5, 15]);
        assert_eq!(rb.post_order().copied().collect::<Vec<_>>(), [5, 15, 10]);
        assert_eq!(rb.level_order().copied().collect::<Vec<_>>(), [10, 5, 15]);
    }

    #[test]
    fn delete_from_ascending() {
        let mut rb = Rbtree::default();
        for i in 1..=10 {
            assert_eq!(rb.insert(i), Ok(()));
        }

        assert_eq!(rb.delete(&5), Ok(5));
        assert!(!rb.contains(&5));
        assert_eq!(rb.size(), 9);
        assert_eq!(rb.in_order().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 6, 7, 8, 9, 10]);
        rb.verify();
    }

    #[test]
    fn one_item() {
        let mut rb = Rbtree::default();

        assert_eq!(rb.insert("only"), Ok(()));
        assert_eq!(rb.insert("only"), Err(DuplicateKey("only")));
        assert_eq!(rb.first(), Some(&"only"));
        assert_eq!(rb.last(), Some(&"only"));

        assert_eq!(rb.delete(&"only"), Ok("only"));
        assert!(rb.is_empty());
        assert_eq!(rb.first(), None);
        assert_eq!(rb.last(), None);
        rb.verify();
    }

    #[test]
    fn duplicate_is_noop() {
        let mut rb: Rbtree<u32> = (0..50).collect();
        let shape = rb.print();
        let size = rb.size();

        for i in (0..50).step_by(7) {
            assert_eq!(rb.insert(i), Err(DuplicateKey(i)));
        }

        assert_eq!(rb.print(), shape);
        assert_eq!(rb.size(), size);
        assert!(rb.in_order().copied().eq(0..50u32));
    }

    #[test]
    fn contains_round_trip() {
        let mut rng = rand::rng();
        let mut keys: Vec<u64> = (0..3000).map(|i| i * 3).collect();
        keys.shuffle(&mut rng);

        let mut rb = Rbtree::default();
        rb.extend(keys.iter().copied());
        rb.verify();

        for k in &keys {
            assert!(rb.contains(k));
            assert!(!rb.contains(&(k + 1)));
        }

        keys.shuffle(&mut rng);
        for k in &keys {
            assert_eq!(rb.delete(k), Ok(*k));
        }

        assert!(rb.is_empty());
        rb.verify();
    }

    #[test]
    fn height_bound() {
        let mut rng = rand::rng();
        let mut rb = Rbtree::default();

        for n in 1..=2000u32 {
            assert!(rb.insert(n).is_ok());
            let bound = 2.0 * f64::from(n + 1).log2();
            assert!(rb.height() as f64 <= bound);
        }

        let doomed: Vec<u32> = (1..=2000).choose_multiple(&mut rng, 1500);
        for d in doomed {
            assert!(rb.delete(&d).is_ok());
            let bound = 2.0 * ((rb.size() + 1) as f64).log2();
            assert!(rb.height() as f64 <= bound);
        }
        rb.verify();
    }

    #[test]
    fn strings_by_length() {
        // Ordered by length first so equal-length strings fall back to lexical order.
        let mut rb = RbtreeGeneric::new(|a: &String, b: &String| {
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        });

        for s in ["pear", "fig", "banana", "kiwi", "apple"] {
            assert!(rb.insert(s.to_owned()).is_ok());
        }

        assert_eq!(rb.first().map(String::as_str), Some("fig"));
        assert_eq!(rb.last().map(String::as_str), Some("banana"));
        assert_eq!(rb.into_values(), ["fig", "kiwi", "pear", "apple", "banana"]);
    }
}
