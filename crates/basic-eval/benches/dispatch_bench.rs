//! Throughput of the statement-dispatch loop (spec.md §5 "Concurrency &
//! resource model" — cooperative chunking depends on per-statement cost
//! staying small and predictable).

use basic_collab::{NoopConsole, NoopDisplay};
use basic_config::RuntimeConfig;
use basic_eval::Interpreter;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const PROGRAM: &str = "\
10 FOR I = 1 TO 2000
20 LET T = T + I
30 NEXT I
40 END
";

fn bench_for_next_loop(c: &mut Criterion) {
    c.bench_function("for_next_2000_iterations", |b| {
        b.iter(|| {
            let mut interp = Interpreter::initialize(
                black_box(PROGRAM),
                Box::new(NoopConsole::default()),
                Box::new(NoopDisplay::default()),
                &RuntimeConfig::default(),
            )
            .unwrap();
            interp.run().unwrap();
            black_box(interp.env.get_variable("T"));
        });
    });
}

criterion_group!(benches, bench_for_next_loop);
criterion_main!(benches);
