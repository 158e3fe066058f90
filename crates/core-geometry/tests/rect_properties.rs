//! Property-based tests for the rectangle algebra.

use core_geometry::Rect;
use proptest::prelude::*;

fn arb_rect() -> impl Strategy<Value = Rect> {
    (-50i32..50, -50i32..50, 0i32..60, 0i32..60)
        .prop_map(|(l, t, w, h)| Rect::sized(l, t, w, h))
}

proptest! {
    // empty <=> width <= 0 or height <= 0
    #[test]
    fn empty_matches_extents(rc in arb_rect()) {
        prop_assert_eq!(rc.is_empty(), rc.width() <= 0 || rc.height() <= 0);
    }

    // intersect(A, B) = intersect(B, A)
    #[test]
    fn intersect_commutes(a in arb_rect(), b in arb_rect()) {
        prop_assert_eq!(a.intersect(&b), b.intersect(&a));
    }

    // union(A, intersect(A, B)) = A for non-empty A
    #[test]
    fn union_absorbs_intersection(a in arb_rect(), b in arb_rect()) {
        prop_assume!(!a.is_empty());
        prop_assert_eq!(a.union(&a.intersect(&b)), a);
    }

    // the intersection is contained in both operands
    #[test]
    fn intersection_contained(a in arb_rect(), b in arb_rect()) {
        let i = a.intersect(&b);
        if !i.is_empty() {
            prop_assert_eq!(a.union(&i), a);
            prop_assert_eq!(b.union(&i), b);
        }
    }

    // both operands are contained in the union
    #[test]
    fn union_contains_operands(a in arb_rect(), b in arb_rect()) {
        let u = a.union(&b);
        prop_assert_eq!(u.union(&a), u);
        prop_assert_eq!(u.union(&b), u);
    }

    // translation preserves extents
    #[test]
    fn offset_preserves_size(rc in arb_rect(), dx in -20i32..20, dy in -20i32..20) {
        let moved = rc.offset(dx, dy);
        prop_assert_eq!(moved.width(), rc.width());
        prop_assert_eq!(moved.height(), rc.height());
    }
}
