use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dumpscope_io::{read_report, InspectOptions};
use dumpscope_test_utils::ArchiveBuilder;
use std::io::{self, Cursor};

fn generate_archive(collections: usize) -> Vec<u8> {
    let mut builder = ArchiveBuilder::new();
    for i in 0..collections {
        let metadata = format!(
            r#"{{"indexes":[{{"v":{{"$numberInt":"2"}},"key":{{"_id":{{"$numberInt":"1"}}}},"name":"_id_"}}],"uuid":"{i:032x}","collectionName":"coll{i}","created":{{"$date":{{"$numberLong":"{}"}}}},"type":"collection"}}"#,
            1_600_000_000_000u64 + i as u64
        );
        builder = builder.collection("bench", &format!("coll{i}"), &metadata);
    }
    builder.build()
}

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("archive_walk");

    for count in [10usize, 1_000] {
        let archive = generate_archive(count);
        group.throughput(Throughput::Bytes(archive.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &archive, |b, archive| {
            b.iter(|| {
                let report = read_report(
                    Cursor::new(black_box(archive.as_slice())),
                    &mut io::sink(),
                    &InspectOptions::default(),
                )
                .unwrap();
                black_box(report)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_walk);
criterion_main!(benches);
