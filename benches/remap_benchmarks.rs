use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use eeg_core::acquisition::{FrameRemapper, FrameSink, RingBufferSink};
use eeg_core::board::BoardId;

const BOARDS: &[BoardId] = &[BoardId::AntNeuroEe410, BoardId::AntNeuroEe213, BoardId::AntNeuroEe211];
const BATCH_SIZES: &[usize] = &[16, 128, 512];

fn raw_batch(eeg_channels: usize, rows: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|i| {
            let mut row = vec![i as f64 * 0.1; eeg_channels];
            row.push(0.0);
            row.push(i as f64);
            row
        })
        .collect()
}

fn benchmark_remap(c: &mut Criterion) {
    let mut group = c.benchmark_group("remap");

    for &board in BOARDS {
        let descriptor = board.descriptor().unwrap();
        let channel_count = descriptor.eeg_channels.len() + 2;

        for &rows in BATCH_SIZES {
            group.throughput(Throughput::Elements(rows as u64));
            let batch = raw_batch(descriptor.eeg_channels.len(), rows);

            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", board), rows),
                &batch,
                |b, batch| {
                    let mut remapper = FrameRemapper::new(descriptor.clone()).unwrap();
                    b.iter(|| {
                        for row in batch {
                            black_box(remapper.remap(row, channel_count, 0.0).unwrap());
                        }
                    });
                },
            );
        }
    }

    group.finish();
}

fn benchmark_ring_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer");
    let frame = vec![1.0f64; BoardId::AntNeuroEe211.descriptor().unwrap().num_rows];

    for &capacity in &[1_000usize, 450_000] {
        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(BenchmarkId::new("push", capacity), &capacity, |b, &capacity| {
            let sink = RingBufferSink::new(capacity).unwrap();
            b.iter(|| {
                for _ in 0..1000 {
                    sink.push(black_box(&frame));
                }
            });
        });
    }

    group.bench_function("push_and_drain", |b| {
        let sink = RingBufferSink::new(4096).unwrap();
        b.iter(|| {
            for _ in 0..256 {
                sink.push(&frame);
            }
            black_box(sink.get_board_data(None));
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_remap, benchmark_ring_buffer);
criterion_main!(benches);
