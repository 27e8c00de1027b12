use super::*;
use crate::foundation::core::{Canvas, Rgba8};
use crate::scene::model::Scene;
use crate::scene::paint::EraseMode;

fn snap(tag: u8) -> Snapshot {
    let mut s = Scene::new(Canvas::new(8, 8).unwrap(), 20.0, EraseMode::Strokes);
    s.set_background_color(Rgba8::rgb(tag, 0, 0));
    Snapshot::capture(&s).unwrap()
}

fn tag(s: &Snapshot) -> u8 {
    s.background_color().r
}

#[test]
fn push_evicts_oldest_first() {
    let mut h = History::new(3);
    for i in 0..5 {
        h.push(snap(i));
    }
    assert_eq!(h.undo_len(), 3);
    let tags: Vec<_> = h.undo_entries().map(tag).collect();
    assert_eq!(tags, vec![2, 3, 4]);
}

#[test]
fn undo_then_redo_walks_both_stacks() {
    let mut h = History::new(10);
    h.push(snap(1));
    h.push(snap(2));

    let prev = h.undo(Some(snap(3))).unwrap();
    assert_eq!(tag(&prev), 2);
    assert!(h.can_redo());

    let next = h.redo(Some(snap(2))).unwrap();
    assert_eq!(tag(&next), 3);
    assert_eq!(h.undo_len(), 2);
    assert!(!h.can_redo());
}

#[test]
fn empty_stacks_are_noops() {
    let mut h = History::new(10);
    assert!(h.undo(Some(snap(1))).is_none());
    assert!(h.redo(Some(snap(1))).is_none());
    assert_eq!(h.redo_len(), 0);
    assert_eq!(h.undo_len(), 0);
}

#[test]
fn new_action_clears_redo() {
    let mut h = History::new(10);
    h.push(snap(1));
    h.undo(Some(snap(2)));
    assert_eq!(h.redo_len(), 1);
    h.push(snap(5));
    assert!(!h.can_redo());
}

#[test]
fn missing_current_snapshot_still_undoes() {
    let mut h = History::new(10);
    h.push(snap(1));
    assert_eq!(h.undo(None).map(|s| tag(&s)), Some(1));
    assert!(!h.can_redo());
}

#[test]
fn zero_capacity_is_raised_to_one() {
    let mut h = History::new(0);
    h.push(snap(1));
    h.push(snap(2));
    assert_eq!(h.capacity(), 1);
    assert_eq!(h.undo_entries().map(tag).collect::<Vec<_>>(), vec![2]);
}

#[test]
fn generation_moves_on_every_stack_change() {
    let mut h = History::new(4);
    let g0 = h.generation();
    h.push(snap(1));
    let g1 = h.generation();
    assert!(g1 > g0);
    h.undo(None).unwrap();
    let g2 = h.generation();
    assert!(g2 > g1);
    assert!(h.undo(None).is_none());
    assert_eq!(h.generation(), g2);
    h.clear();
    assert!(h.generation() > g2);
}
