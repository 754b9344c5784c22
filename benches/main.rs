#[macro_use]
extern crate criterion;

mod btreeset;
mod skipset;

criterion_group!(benches, crate::skipset::benchmark, crate::btreeset::benchmark);
criterion_main!(benches);
