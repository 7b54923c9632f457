//! Selections a dimension can hold.

use super::key::{Key, Scalar};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

pub type KeyPredicate = Arc<dyn Fn(&Key) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum Filter {
    Exact(Key),
    /// Half-open `[lo, hi)`.
    Range { lo: Key, hi: Key },
    /// Any of the listed keys (multi-select menus).
    OneOf(BTreeSet<Key>),
    /// Two-dimensional brush over the first two key components, half-open on both axes.
    Rect { x: (Scalar, Scalar), y: (Scalar, Scalar) },
    Predicate(KeyPredicate),
}

impl Filter {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Key) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Arc::new(f))
    }

    pub fn one_of<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Filter::OneOf(keys.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, key: &Key) -> bool {
        match self {
            Filter::Exact(k) => k == key,
            Filter::Range { lo, hi } => lo <= key && key < hi,
            Filter::OneOf(keys) => keys.contains(key),
            Filter::Rect { x, y } => match (key.component(0), key.component(1)) {
                (Some(kx), Some(ky)) => &x.0 <= kx && kx < &x.1 && &y.0 <= ky && ky < &y.1,
                _ => false,
            },
            Filter::Predicate(f) => f(key),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Exact(k) => f.debug_tuple("Exact").field(k).finish(),
            Filter::Range { lo, hi } => f.debug_struct("Range").field("lo", lo).field("hi", hi).finish(),
            Filter::OneOf(keys) => f.debug_tuple("OneOf").field(keys).finish(),
            Filter::Rect { x, y } => f.debug_struct("Rect").field("x", x).field("y", y).finish(),
            Filter::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use smallvec::smallvec;

    #[rstest]
    #[case(0, true)]
    #[case(9, true)]
    #[case(10, false)]
    #[case(-1, false)]
    fn test_range_is_half_open(#[case] value: i64, #[case] expected: bool) {
        let filter = Filter::Range { lo: Key::int(0), hi: Key::int(10) };
        assert_eq!(filter.matches(&Key::int(value)), expected);
    }

    #[test]
    fn test_one_of_and_exact() {
        let menu = Filter::one_of(["A", "B"]);
        assert!(menu.matches(&Key::text("A")));
        assert!(!menu.matches(&Key::text("C")));
        assert!(Filter::Exact(Key::text("C")).matches(&Key::text("C")));
    }

    #[test]
    fn test_rect_brush_over_tuple_keys() {
        let brush = Filter::Rect {
            x: (Scalar::Int(5), Scalar::Int(20)),
            y: (Scalar::Int(80000), Scalar::Int(120000)),
        };
        let inside = Key::Tuple(smallvec![Scalar::Int(10), Scalar::Int(100000), Scalar::Text("Prof".into())]);
        let outside = Key::Tuple(smallvec![Scalar::Int(25), Scalar::Int(100000)]);
        assert!(brush.matches(&inside));
        assert!(!brush.matches(&outside));
        assert!(!brush.matches(&Key::int(10)));
    }

    #[test]
    fn test_predicate_filter() {
        let even = Filter::predicate(|k| k.component(0).and_then(Scalar::as_int).map_or(false, |v| v % 2 == 0));
        assert!(even.matches(&Key::int(4)));
        assert!(!even.matches(&Key::int(3)));
        assert_eq!(format!("{:?}", even), "Predicate(..)");
    }
}
