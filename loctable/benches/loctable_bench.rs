use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use loctable::{LocTable, TableBuilder};

/// Source text with `rows` rows of three languages each.
fn source(rows: usize) -> Vec<u8> {
    let mut text = Vec::new();
    for i in 0..rows {
        text.extend_from_slice(format!("string {i} | chaine {i} | mojiretsu {i} |").as_bytes());
    }
    text
}

fn encode_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for rows in [10, 1_000, 100_000].iter() {
        let text = source(*rows);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &text, |b, text| {
            b.iter(|| TableBuilder::new().encode(text, 3).ok())
        });
    }
    group.finish();
}

fn lookup_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    for rows in [10, 1_000, 100_000].iter() {
        let tables = TableBuilder::new()
            .encode(&source(*rows), 3)
            .unwrap_or_default();
        let Some(table) = tables.into_iter().nth(1).map(LocTable::from_bytes) else {
            continue;
        };
        let keys: Vec<String> = (0..*rows).step_by(7).map(|i| format!("string {i}")).collect();
        group.throughput(Throughput::Elements(keys.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &keys, |b, keys| {
            b.iter(|| keys.iter().filter(|key| table.get(key.as_bytes()).is_some()).count())
        });
    }
    group.finish();
}

criterion_group!(benches, encode_sizes, lookup_sizes);
criterion_main!(benches);
