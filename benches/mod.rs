use criterion::{criterion_group, criterion_main};


criterion_group!(
    benches,
    shell::bench_decode,
    shell::bench_history,
    shell::bench_session_feed
);
criterion_main!(benches);
