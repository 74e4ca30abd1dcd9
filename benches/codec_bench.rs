//! Benchmarks for typewire framing

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use serde::{Deserialize, Serialize};
use typewire::calc::{self, Add, Command};
use typewire::{new_codec, wire_enum, BincodeMarshaller, Codec, JsonMarshaller, Marshaller};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Blob {
    data: Vec<u8>,
}

wire_enum! {
    #[derive(Debug, Clone)]
    enum Bulk {
        Blob(Blob),
    }
}

fn blob_codec<M: Marshaller>(marshaller: M) -> Codec<Bulk, Bulk, M> {
    new_codec(marshaller, Bulk::registered_types(), Bulk::registered_types())
        .expect("valid type lists")
}

fn small_command_benchmarks(c: &mut Criterion) {
    let client = calc::client_codec(BincodeMarshaller).expect("valid type lists");
    let server = calc::server_codec(BincodeMarshaller).expect("valid type lists");
    let command = Command::Add(Add { a: 40, b: 2 });
    let encoded = client.encode_to_vec(&command).expect("encode");

    let mut group = c.benchmark_group("small_command");
    group.throughput(Throughput::Elements(1));

    group.bench_function("encode", |b| {
        let mut buf = Vec::with_capacity(64);
        b.iter(|| {
            buf.clear();
            client.encode(black_box(&command), &mut buf).expect("encode")
        })
    });

    group.bench_function("decode", |b| {
        b.iter(|| server.decode_from_slice(black_box(&encoded)).expect("decode"))
    });

    group.finish();
}

fn payload_size_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("blob_roundtrip");

    for size in [64usize, 4096, 65536] {
        let value = Bulk::Blob(Blob {
            data: (0..size).map(|i| i as u8).collect(),
        });
        group.throughput(Throughput::Bytes(size as u64));

        let bincode = blob_codec(BincodeMarshaller);
        group.bench_function(format!("bincode/{}", size), |b| {
            b.iter(|| {
                let bytes = bincode.encode_to_vec(black_box(&value)).expect("encode");
                bincode.decode_from_slice(&bytes).expect("decode")
            })
        });

        let json = blob_codec(JsonMarshaller);
        group.bench_function(format!("json/{}", size), |b| {
            b.iter(|| {
                let bytes = json.encode_to_vec(black_box(&value)).expect("encode");
                json.decode_from_slice(&bytes).expect("decode")
            })
        });
    }

    group.finish();
}

criterion_group!(benches, small_command_benchmarks, payload_size_benchmarks);
criterion_main!(benches);
