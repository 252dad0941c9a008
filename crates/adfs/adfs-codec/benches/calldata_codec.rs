use adfs_codec::{
    FeedUpdate, ReadQuery, RingBufferTable, WriteBatch, WriteHeader, decode_read_response,
    decode_write, encode_write, split_into_slots,
};
use adfs_types::{FeedKey, HeaderMode};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// A batch shaped like a sequencer round: mostly single-slot feeds packed
/// into a handful of rows, plus a few wide ones.
fn batch(feeds: u128) -> WriteBatch {
    let updates = (0..feeds)
        .map(|id| {
            let stride = if id % 10 == 0 { 2 } else { 0 };
            let len = 32usize << stride;
            FeedUpdate::new(id, stride, (id % 8192) as u16, vec![id as u8; len])
        })
        .collect();
    WriteBatch::new(WriteHeader::BlockNumber(1_000_000), updates)
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("adfs_write");

    for feeds in [16u128, 256, 2048] {
        let batch = batch(feeds);
        let prior = RingBufferTable::new();
        let calldata = encode_write(&batch, &prior).expect("encode failed");

        group.throughput(Throughput::Elements(feeds as u64));
        group.bench_with_input(BenchmarkId::new("encode", feeds), &batch, |b, batch| {
            b.iter(|| black_box(encode_write(black_box(batch), &prior).expect("encode failed")))
        });
        group.bench_with_input(BenchmarkId::new("decode", feeds), &calldata, |b, calldata| {
            b.iter(|| {
                let decoded =
                    decode_write(black_box(calldata), HeaderMode::BlockNumber).expect("decode failed");
                black_box(decoded.feeds.len())
            })
        });
    }

    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("adfs_read");
    group.throughput(Throughput::Elements(1));

    let query = ReadQuery::LatestDataAndIndex {
        feed: FeedKey::new(7u128, 4),
        slice: None,
    };
    let response = vec![0u8; 32 + 16 * 32];

    group.bench_with_input(BenchmarkId::new("decode_response", "stride4"), &response, |b, r| {
        b.iter(|| black_box(decode_read_response(&query, black_box(r)).expect("decode failed")))
    });
    group.bench_with_input(BenchmarkId::new("split_into_slots", "stride4"), &response, |b, r| {
        b.iter(|| black_box(split_into_slots(black_box(r)).len()))
    });

    group.finish();
}

criterion_group!(benches, bench_write, bench_read);
criterion_main!(benches);
