use std::time::Duration;

use covert::kms::blowfish::Blowfish;
use covert::kms::{Cipher, Key};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Generate a payload of given size.
fn generate_payload(size: usize) -> Vec<u8> {
    vec![b'x'; size]
}

/// Benchmark encrypt/decrypt roundtrip with varying payload sizes.
fn bench_encrypt_decrypt(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("encrypt_decrypt");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let cipher = Blowfish;
    let key = Key::parse("blowfish://default").unwrap();
    let sizes = [32, 256, 1024, 4096, 16384];

    for size in sizes {
        let payload = generate_payload(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(
            BenchmarkId::new("roundtrip", format!("{}B", size)),
            &payload,
            |b, payload| {
                b.iter(|| {
                    runtime.block_on(async {
                        let encrypted = cipher
                            .encrypt(black_box(&key), black_box(payload))
                            .await
                            .unwrap();
                        let decrypted = cipher
                            .decrypt(black_box(&key), black_box(&encrypted))
                            .await
                            .unwrap();
                        black_box(decrypted);
                    });
                });
            },
        );
    }

    group.finish();
}

/// Benchmark encryption only.
fn bench_encrypt(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("encrypt");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let cipher = Blowfish;
    let key = Key::parse("blowfish://default").unwrap();
    let sizes = [32, 256, 1024, 4096, 16384];

    for size in sizes {
        let payload = generate_payload(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(
            BenchmarkId::new("encrypt", format!("{}B", size)),
            &payload,
            |b, payload| {
                b.iter(|| {
                    runtime.block_on(async {
                        let encrypted = cipher
                            .encrypt(black_box(&key), black_box(payload))
                            .await
                            .unwrap();
                        black_box(encrypted);
                    });
                });
            },
        );
    }

    group.finish();
}

/// Benchmark decryption only.
fn bench_decrypt(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("decrypt");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let cipher = Blowfish;
    let key = Key::parse("blowfish://default").unwrap();
    let sizes = [32, 256, 1024, 4096, 16384];

    for size in sizes {
        let payload = generate_payload(size);
        let encrypted = runtime.block_on(cipher.encrypt(&key, &payload)).unwrap();
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(
            BenchmarkId::new("decrypt", format!("{}B", size)),
            &encrypted,
            |b, encrypted| {
                b.iter(|| {
                    runtime.block_on(async {
                        let decrypted = cipher
                            .decrypt(black_box(&key), black_box(encrypted))
                            .await
                            .unwrap();
                        black_box(decrypted);
                    });
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_encrypt_decrypt, bench_encrypt, bench_decrypt);
criterion_main!(benches);
