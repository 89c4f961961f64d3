use d2dgc::*;
use proptest::prelude::*;
use std::f32::consts::{PI, TAU};

fn renderer() -> Renderer<Recorder> {
    Renderer::new(Recorder::new())
}

fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < 1e-3, "{} != {}", a, b);
}

#[test]
fn full_turn_arc_is_a_circle() {
    let renderer = renderer();
    let mut arc = renderer.create_path();
    arc.add_arc(50.0, 50.0, 20.0, 0.0, TAU, true).unwrap();
    let mut circle = renderer.create_path();
    circle.add_circle(50.0, 50.0, 20.0).unwrap();

    let (a, c) = (arc.bounds().unwrap(), circle.bounds().unwrap());
    assert_close(a.origin.x, c.origin.x);
    assert_close(a.origin.y, c.origin.y);
    assert_close(a.size.width, 40.0);
    assert_close(a.size.height, 40.0);
    for (x, y) in [(50.0, 50.0), (65.0, 50.0), (50.0, 31.0), (69.0, 69.0), (80.0, 50.0)] {
        assert_eq!(
            arc.contains(x, y, FillRule::Winding).unwrap(),
            circle.contains(x, y, FillRule::Winding).unwrap(),
            "({}, {})",
            x,
            y
        );
    }
    assert_eq!(arc.figure_count().unwrap(), 1);
}

#[test]
fn half_arc_bounds() {
    let renderer = renderer();
    let mut path = renderer.create_path();
    path.add_arc(0.0, 0.0, 10.0, 0.0, PI, true).unwrap();
    let b = path.bounds().unwrap();
    assert_close(b.origin.x, -10.0);
    assert_close(b.origin.y, 0.0);
    assert_close(b.size.width, 20.0);
    assert_close(b.size.height, 10.0);
    let end = path.current_point().unwrap();
    assert_close(end.x, -10.0);
    assert_close(end.y, 0.0);
}

#[test]
fn arc_past_a_full_turn_is_reduced() {
    let renderer = renderer();
    let mut path = renderer.create_path();
    path.add_arc(0.0, 0.0, 10.0, 0.0, 3.0 * PI, true).unwrap();
    let b = path.bounds().unwrap();
    assert_close(b.origin.y, 0.0);
    assert_close(b.size.width, 20.0);
    assert_close(b.size.height, 10.0);
    let end = path.current_point().unwrap();
    assert_close(end.x, -10.0);
    assert_close(end.y, 0.0);

    let mut circle = renderer.create_path();
    circle.add_arc(0.0, 0.0, 10.0, 0.0, 2.0 * TAU, true).unwrap();
    assert_close(circle.bounds().unwrap().size.height, 20.0);
}

#[test]
fn cubic_bounds_follow_the_curve() {
    let renderer = renderer();
    let mut path = renderer.create_path();
    path.move_to(0.0, 0.0).unwrap();
    path.curve_to(0.0, 10.0, 10.0, 10.0, 10.0, 0.0).unwrap();
    let b = path.bounds().unwrap();
    assert_close(b.size.width, 10.0);
    assert_close(b.size.height, 7.5);
    let end = path.current_point().unwrap();
    assert_eq!((end.x, end.y), (10.0, 0.0));
}

#[test]
fn quad_curve_is_elevated() {
    let renderer = renderer();
    let mut path = renderer.create_path();
    path.move_to(0.0, 0.0).unwrap();
    path.quad_curve_to(10.0, 20.0, 20.0, 0.0).unwrap();
    let b = path.bounds().unwrap();
    assert_close(b.size.width, 20.0);
    assert_close(b.size.height, 10.0);
    assert_eq!(path.figure_count().unwrap(), 1);
    assert!(path.contains(10.0, 5.0, FillRule::Winding).unwrap());
    assert!(!path.contains(10.0, 11.0, FillRule::Winding).unwrap());
}

#[test]
fn transform_applies_to_bounds_only() {
    let renderer = renderer();
    let mut path = renderer.create_path();
    path.add_rectangle(0.0, 0.0, 10.0, 10.0).unwrap();
    path.transform(&Matrix::translation(100.0, 0.0));
    let b = path.bounds().unwrap();
    assert_eq!((b.origin.x, b.origin.y), (100.0, 0.0));
    assert!(path.contains(105.0, 5.0, FillRule::EvenOdd).unwrap());
    assert!(!path.contains(5.0, 5.0, FillRule::EvenOdd).unwrap());
    let untransformed = path.geometry().unwrap().bounds(None).unwrap();
    assert_eq!(untransformed.origin.x, 0.0);
}

#[test]
fn fill_rules_differ_on_overlap() {
    let renderer = renderer();
    let mut path = renderer.create_path();
    path.add_rectangle(0.0, 0.0, 20.0, 20.0).unwrap();
    path.add_rectangle(5.0, 5.0, 10.0, 10.0).unwrap();
    assert!(!path.contains(10.0, 10.0, FillRule::EvenOdd).unwrap());
    assert!(path.contains(10.0, 10.0, FillRule::Winding).unwrap());
    assert!(path.contains(2.0, 2.0, FillRule::EvenOdd).unwrap());
}

proptest! {
    #[test]
    fn one_figure_per_move(
        figures in prop::collection::vec(
            prop::collection::vec((-100.0f32..100.0, -100.0f32..100.0), 2..6),
            1..8,
        ),
        close in any::<bool>(),
    ) {
        let renderer = renderer();
        let mut path = renderer.create_path();
        for points in &figures {
            path.move_to(points[0].0, points[0].1).unwrap();
            for &(x, y) in &points[1..] {
                path.line_to(x, y).unwrap();
            }
            if close {
                path.close_subpath().unwrap();
            }
        }
        prop_assert_eq!(path.figure_count().unwrap(), figures.len());
    }

    #[test]
    fn bounds_cover_every_point(
        points in prop::collection::vec((-100.0f32..100.0, -100.0f32..100.0), 2..12),
    ) {
        let renderer = renderer();
        let mut path = renderer.create_path();
        path.move_to(points[0].0, points[0].1).unwrap();
        for &(x, y) in &points[1..] {
            path.line_to(x, y).unwrap();
        }
        let b = path.bounds().unwrap();
        for &(x, y) in &points {
            prop_assert!(x >= b.origin.x - 1e-3 && x <= b.origin.x + b.size.width + 1e-3);
            prop_assert!(y >= b.origin.y - 1e-3 && y <= b.origin.y + b.size.height + 1e-3);
        }
    }
}
