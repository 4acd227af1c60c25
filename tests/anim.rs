use egui::{pos2, Rect};
use latscope::anim::EntryAnimator;
use latscope::{Sample, SampleAttrs};

fn sample(id: &str) -> Sample {
    Sample {
        id: id.to_owned(),
        timestamp_ms: 1_000,
        response_time_ms: 100.0,
        attrs: SampleAttrs::default(),
    }
}

fn plot() -> Rect {
    Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 400.0))
}

#[test]
fn new_samples_fly_in_from_outside_and_settle_on_target() {
    let mut anim = EntryAnimator::with_seed(7);
    let target = pos2(400.0, 200.0);

    anim.observe(&[sample("s1")], 0.0);

    let (start, flying) = anim.pos_of("s1", plot(), target, 0.0);
    assert!(flying);
    assert!(
        !plot().contains(start),
        "flights start outside the plot, got {start:?}"
    );

    let (mid, flying) = anim.pos_of("s1", plot(), target, 0.3);
    assert!(flying);
    assert!(mid != start && mid != target, "mid-flight is strictly between");
    assert!(
        mid.distance(target) < start.distance(target),
        "easing moves toward the target"
    );

    // All flights last at most 850ms.
    let (settled, flying) = anim.pos_of("s1", plot(), target, 1.0);
    assert!(!flying);
    assert_eq!(settled, target);
    assert!(!anim.any_active(1.0));
}

#[test]
fn position_queries_within_a_frame_agree() {
    let mut anim = EntryAnimator::with_seed(7);
    let target = pos2(400.0, 200.0);

    anim.observe(&[sample("s1")], 0.0);

    // The marker and the hover ring each ask for the sample's position;
    // mid-flight both answers must land on the glyph, not the settled spot.
    let (first, flying) = anim.pos_of("s1", plot(), target, 0.3);
    let (second, _) = anim.pos_of("s1", plot(), target, 0.3);
    assert!(flying);
    assert_eq!(first, second, "the same frame clock yields the same point");
    assert!(
        first != target,
        "mid-flight the glyph is away from its settled spot"
    );

    let (settled, _) = anim.pos_of("s1", plot(), target, 2.0);
    assert_eq!(settled, target, "adornments converge on the target once settled");
}

#[test]
fn already_seen_samples_do_not_reanimate() {
    let mut anim = EntryAnimator::with_seed(7);
    let target = pos2(400.0, 200.0);

    anim.observe(&[sample("s1")], 0.0);
    anim.observe(&[sample("s1")], 2.0);
    anim.observe(&[sample("s1")], 3.0);

    let (pos, flying) = anim.pos_of("s1", plot(), target, 3.0);
    assert!(!flying, "a sample only animates on first appearance");
    assert_eq!(pos, target);
}

#[test]
fn ids_that_left_the_window_fly_in_again_on_return() {
    let mut anim = EntryAnimator::with_seed(7);
    let target = pos2(400.0, 200.0);

    anim.observe(&[sample("s1")], 0.0);
    anim.observe(&[], 2.0);
    anim.observe(&[sample("s1")], 4.0);

    let (_, flying) = anim.pos_of("s1", plot(), target, 4.0);
    assert!(flying, "an evicted-then-refetched sample animates again");
}

#[test]
fn late_joiners_get_their_own_flights() {
    let mut anim = EntryAnimator::with_seed(7);
    let target = pos2(400.0, 200.0);

    anim.observe(&[sample("s1")], 0.0);
    anim.observe(&[sample("s1"), sample("s2")], 0.5);

    let (_, s1_flying) = anim.pos_of("s1", plot(), target, 1.0);
    let (_, s2_flying) = anim.pos_of("s2", plot(), target, 1.0);
    assert!(!s1_flying, "s1's flight is over by now");
    assert!(s2_flying, "s2 started later and is still in the air");
    assert!(anim.any_active(1.0));
    assert!(!anim.any_active(1.5), "both flights end within 850ms of starting");
}

#[test]
fn seeded_animators_are_deterministic() {
    let mut a = EntryAnimator::with_seed(42);
    let mut b = EntryAnimator::with_seed(42);
    let target = pos2(250.0, 120.0);

    a.observe(&[sample("s1"), sample("s2")], 0.0);
    b.observe(&[sample("s1"), sample("s2")], 0.0);

    for id in ["s1", "s2"] {
        for now in [0.0, 0.2, 0.4] {
            assert_eq!(
                a.pos_of(id, plot(), target, now),
                b.pos_of(id, plot(), target, now),
                "same seed, same flight path"
            );
        }
    }
}

#[test]
fn reset_forgets_all_state() {
    let mut anim = EntryAnimator::with_seed(7);
    anim.observe(&[sample("s1")], 0.0);
    assert!(anim.any_active(0.1));

    anim.reset();
    assert!(!anim.any_active(0.1));

    anim.observe(&[sample("s1")], 1.0);
    let (_, flying) = anim.pos_of("s1", plot(), pos2(10.0, 10.0), 1.0);
    assert!(flying, "after a reset everything reads as new");
}
