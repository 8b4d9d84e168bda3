use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scenic_animation_core::{Animation, CurveCache, Config, FramePoint, ValueKind};
use std::sync::Arc;

fn keyed_animation(keys: i64, kind: ValueKind) -> (Animation, scenic_animation_core::ParameterId) {
    let mut animation = Animation::new("bench");
    let p = animation.add_parameter("camera.heading", 0.0);
    for i in 0..keys {
        let value = ((i * 37) % 11) as f64;
        animation
            .set_value(p, i * 24, value, kind, false)
            .expect("unique frames");
    }
    (animation, p)
}

fn linear_benchmark(c: &mut Criterion) {
    let (animation, p) = keyed_animation(100, ValueKind::Linear);
    c.bench_function("value_at_frame_linear", |b| {
        b.iter(|| black_box(animation.value_at_frame(p, black_box(1213))))
    });
}

fn bezier_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_at_frame_bezier");
    for keys in [10, 100, 1000] {
        let (animation, p) = keyed_animation(keys, ValueKind::Bezier);
        // warm the curve cache for the sampled segment
        let _ = animation.value_at_frame(p, 13);
        group.bench_function(format!("{keys}_keys_cached"), |b| {
            b.iter(|| black_box(animation.value_at_frame(p, black_box(13))))
        });
    }
    group.finish();
}

fn cold_curve_benchmark(c: &mut Criterion) {
    let config = Config::default();
    c.bench_function("value_at_frame_bezier_cold", |b| {
        b.iter(|| {
            let cache: Arc<CurveCache<FramePoint>> = Arc::new(CurveCache::from_config(&config));
            let mut animation =
                Animation::with_cache("cold", config.clone(), cache).expect("valid config");
            let p = animation.add_parameter("fog.distance", 0.0);
            animation.set_value(p, 0, 0.0, ValueKind::Bezier, false).expect("key");
            animation.set_value(p, 48, 1.0, ValueKind::Bezier, false).expect("key");
            black_box(animation.value_at_frame(p, 24))
        })
    });
}

criterion_group!(benches, linear_benchmark, bezier_benchmark, cold_curve_benchmark);
criterion_main!(benches);
