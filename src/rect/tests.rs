use crate::rect::{Rect, Region};

#[test]
fn rect_rejects_negative() {
    assert!(Rect::new(10, 10, 5, 20).is_none());
    assert!(Rect::new_sized(0, 0, -1, 10).is_none());
}

#[test]
fn rect_intersect() {
    let r1 = Rect::new(0, 0, 10, 10).unwrap();
    let r2 = Rect::new(5, 5, 15, 15).unwrap();
    assert_eq!(r1.intersect(r2), Rect::new(5, 5, 10, 10).unwrap());
    let r3 = Rect::new(20, 20, 30, 30).unwrap();
    assert!(r1.intersect(r3).is_empty());
}

#[test]
fn region_extents() {
    let region = Region::from_rects(&[
        Rect::new(0, 0, 10, 10).unwrap(),
        Rect::new(5, 5, 20, 15).unwrap(),
    ]);
    assert_eq!(region.extents(), Rect::new(0, 0, 20, 15).unwrap());
}

#[test]
fn region_union() {
    let r1 = Region::new(Rect::new(0, 0, 10, 10).unwrap());
    let r2 = Region::new(Rect::new(10, 0, 20, 10).unwrap());
    let union = r1.union(&r2);
    assert_eq!(union.rects().len(), 2);
    assert_eq!(union.extents(), Rect::new(0, 0, 20, 10).unwrap());
}

#[test]
fn region_intersect_drops_empty() {
    let r1 = Region::new(Rect::new(0, 0, 10, 10).unwrap());
    let r2 = Region::new(Rect::new(10, 10, 20, 20).unwrap());
    assert!(r1.intersect(&r2).is_empty());
}

#[test]
fn region_translate() {
    let region = Region::new(Rect::new(5, 5, 10, 10).unwrap());
    let moved = region.translate(-5, -5);
    assert_eq!(moved.extents(), Rect::new(0, 0, 5, 5).unwrap());
}

#[test]
fn empty_rects_are_discarded() {
    let region = Region::new(Rect::new(5, 5, 5, 20).unwrap());
    assert!(region.is_empty());
}
