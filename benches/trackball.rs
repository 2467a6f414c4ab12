use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{DVec2, DVec3};
use globe_view::config::TrackballSettings;
use globe_view::core::trackball::{clamp_to_globe, motion, trackball_coordinate};
use globe_view::core::{ButtonMask, ButtonPressEvent, Camera, FrameEvent, GlobeTrackball, MoveEvent};
use globe_view::math::{Ellipsoid, EllipsoidModel, Geodetic, LookAt, RenderArea};
use globe_view::traits::InputHandler;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Look-at frame 20 km above a mid-latitude point
fn london_frame(wgs84: &Ellipsoid) -> LookAt {
    let eye = wgs84.to_ecef(Geodetic::from_degrees(51.5, -0.12, 20_000.0));
    let center = wgs84.to_ecef(Geodetic::from_degrees(51.5, -0.12, 0.0));
    LookAt::new(eye, center, DVec3::Z)
}

/// Benchmark: ECEF to geodetic conversion at several latitudes
fn bench_to_geodetic(c: &mut Criterion) {
    let wgs84 = Ellipsoid::wgs84();
    let mut group = c.benchmark_group("to_geodetic");

    for latitude in [0.0, 45.0, 89.9].iter() {
        let point = wgs84.to_ecef(Geodetic::from_degrees(*latitude, 10.0, 1_000.0));
        group.bench_with_input(BenchmarkId::new("latitude", latitude), &point, |b, point| {
            b.iter(|| black_box(wgs84.to_geodetic(black_box(*point))));
        });
    }

    group.finish();
}

/// Benchmark: pinning a frame to the globe
fn bench_clamp(c: &mut Criterion) {
    let wgs84 = Ellipsoid::wgs84();
    let frame = london_frame(&wgs84);

    c.bench_function("clamp_to_globe", |b| {
        b.iter(|| {
            let mut look_at = frame;
            clamp_to_globe(black_box(&mut look_at), &wgs84, 1.0);
            black_box(look_at)
        });
    });
}

/// Benchmark: the three frame motions without clamping
fn bench_motions(c: &mut Criterion) {
    let wgs84 = Ellipsoid::wgs84();
    let frame = london_frame(&wgs84);
    let mut group = c.benchmark_group("motion");

    group.bench_function("rotate", |b| {
        b.iter(|| {
            let mut look_at = frame;
            motion::rotate(&mut look_at, black_box(0.01), DVec3::Y);
            black_box(look_at)
        });
    });

    group.bench_function("zoom", |b| {
        b.iter(|| {
            let mut look_at = frame;
            motion::zoom(&mut look_at, black_box(0.1));
            black_box(look_at)
        });
    });

    group.bench_function("pan_globe", |b| {
        b.iter(|| {
            let mut look_at = frame;
            motion::pan_globe(&mut look_at, black_box(DVec2::new(0.01, 0.02)), 0.3, wgs84.radius_equator());
            black_box(look_at)
        });
    });

    group.finish();
}

/// Benchmark: trackball dome lookup
fn bench_trackball_coordinate(c: &mut Criterion) {
    c.bench_function("trackball_coordinate", |b| {
        b.iter(|| black_box(trackball_coordinate(black_box(DVec2::new(0.3, -0.4)))));
    });
}

/// Benchmark: one rotate-drag frame through the event interface
fn bench_drag_frame(c: &mut Criterion) {
    let wgs84 = Arc::new(Ellipsoid::wgs84());
    let camera = Camera::from_look_at(london_frame(&wgs84), RenderArea::from_size(1280, 720));
    let mut trackball = GlobeTrackball::new(camera, Some(wgs84), TrackballSettings::default());

    trackball.button_press(&mut ButtonPressEvent::new(640, 360, ButtonMask::PRIMARY, 1));
    trackball.pointer_move(&mut MoveEvent::new(650, 365, ButtonMask::PRIMARY));

    let mut time = Instant::now();
    let mut frame_count = 0;
    trackball.frame(&mut FrameEvent::new(frame_count, time));

    c.bench_function("rotate_drag_frame", |b| {
        b.iter(|| {
            frame_count += 1;
            time += Duration::from_millis(16);
            trackball.frame(&mut FrameEvent::new(frame_count, time));
            black_box(trackball.look_at())
        });
    });
}

criterion_group!(
    benches,
    bench_to_geodetic,
    bench_clamp,
    bench_motions,
    bench_trackball_coordinate,
    bench_drag_frame
);
criterion_main!(benches);
