//! Throughput of a `PAINT`-style flood fill through a full program run
//! (spec.md §4.D "Paint"), the hot path for any screen-heavy program.

use basic_collab::{NoopConsole, NoopDisplay};
use basic_config::RuntimeConfig;
use basic_eval::Interpreter;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const PROGRAM: &str = "\
10 SCREEN 13
20 LINE (10, 10)-(200, 150), 4, B
30 PAINT (100, 80), 9, 4
40 END
";

fn bench_paint_fill(c: &mut Criterion) {
    c.bench_function("paint_fill_320x200_box", |b| {
        b.iter(|| {
            let mut interp = Interpreter::initialize(
                black_box(PROGRAM),
                Box::new(NoopConsole::default()),
                Box::new(NoopDisplay::default()),
                &RuntimeConfig::default(),
            )
            .unwrap();
            interp.run().unwrap();
            black_box(interp.env.graphics.active_page().get_pixel(100, 80));
        });
    });
}

criterion_group!(benches, bench_paint_fill);
criterion_main!(benches);
