//! # Guidance Control Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use guid_lib::guid_ctrl::{GeoPoint, GuidCtrl, LoiterDirection, Params, PathCmd, PathDesc};
use nalgebra::Vector2;

fn guid_ctrl_benchmark(c: &mut Criterion) {
    // ---- Build the controller ----

    let params = Params {
        roll_time_const_s: 0.5,
        en_track_keeping: true,
        en_min_ground_speed: true,
        min_gsp_cmd_ms: 3.0,
        roll_slew_rate_rads: 1.0,
        dt_s: 0.02,
        ..Default::default()
    };
    let mut guid_ctrl = GuidCtrl::new(params).unwrap();

    // A loiter in a strong cross wind, 30 m outside the circle
    let center = GeoPoint::new(47.0, 8.0);
    let vehicle_pos = center.offset_by(&Vector2::new(130.0, 0.0));
    let path_cmd = PathCmd::Loiter {
        center,
        radius_m: 100.0,
        direction: LoiterDirection::Clockwise,
    };
    let ground_vel = Vector2::new(-3.0, 22.0);
    let wind_vel = Vector2::new(4.0, 12.0);

    let path = PathDesc::loiter(
        &Vector2::new(130.0, 0.0),
        100.0,
        LoiterDirection::Clockwise,
        &ground_vel,
    );

    // ---- Benchmarks ----

    c.bench_function("evaluate", |b| {
        b.iter(|| guid_ctrl.evaluate(black_box(&ground_vel), black_box(&wind_vel), &path))
    });

    c.bench_function("navigate_loiter", |b| {
        b.iter(|| {
            guid_ctrl.navigate(
                &path_cmd,
                black_box(&vehicle_pos),
                black_box(&ground_vel),
                black_box(&wind_vel),
            )
        })
    });
}

criterion_group!(benches, guid_ctrl_benchmark);
criterion_main!(benches);
