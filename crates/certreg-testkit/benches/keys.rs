use certreg_core::{
    content_cert_id_key, decode_id_list, encode_id_list, CertificateType, KvPair,
    RequestContentType,
};
use certreg::StoreDecoder;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn content_key(c: &mut Criterion) {
    let content = "0x".to_string() + &"ab".repeat(32);
    c.bench_function("content_cert_id_key", |b| {
        b.iter(|| {
            content_cert_id_key(
                black_box(CertificateType::Auditing),
                black_box(RequestContentType::SourceCodeHash),
                black_box(&content),
            )
        })
    });
}

fn id_list(c: &mut Criterion) {
    let ids: Vec<u64> = (1..=256).collect();
    let packed = encode_id_list(&ids);
    c.bench_function("decode_id_list_256", |b| {
        b.iter(|| decode_id_list(black_box(&packed)))
    });
}

fn decode_pair(c: &mut Criterion) {
    let decoder: StoreDecoder = StoreDecoder::default();
    let key = certreg_core::certifier_cert_ids_key(&certreg_core::Address::from_bytes([1; 20]));
    let a = KvPair::new(key.clone(), encode_id_list(&[3, 7, 42]));
    let b = KvPair::new(key, encode_id_list(&[3, 7]));
    c.bench_function("decode_pair_id_list", |bench| {
        bench.iter(|| decoder.decode_pair(black_box(&a), black_box(&b)))
    });
}

criterion_group!(benches, content_key, id_list, decode_pair);
criterion_main!(benches);
