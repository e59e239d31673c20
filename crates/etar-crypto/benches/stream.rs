use etar_crypto::{derive_key, DerivedKey, FileCipher, Header, KdfParams, SALT_SIZE};
use secrecy::SecretString;

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn cheap_cipher() -> FileCipher {
    FileCipher::new(KdfParams::new(1))
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt_stream(bencher: divan::Bencher, size: usize) {
    let cipher = cheap_cipher();
    let password = SecretString::from("bench-password");
    let data = make_data(size);
    let mut out = Vec::with_capacity(size + 64);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench_local(|| {
            out.clear();
            cipher
                .encrypt(divan::black_box(&data[..]), &mut out, &password)
                .unwrap()
        });
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt_stream(bencher: divan::Bencher, size: usize) {
    let cipher = cheap_cipher();
    let password = SecretString::from("bench-password");
    let data = make_data(size);
    let mut container = Vec::new();
    cipher
        .encrypt_with_header(&Header::generate(), &data[..], &mut container, &password)
        .unwrap();
    let mut out = Vec::with_capacity(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench_local(|| {
            out.clear();
            cipher
                .decrypt(divan::black_box(&container[..]), &mut out, &password)
                .unwrap()
        });
}

#[divan::bench(sample_count = 10)]
fn bench_derive_key_production() -> DerivedKey {
    let password = SecretString::from("bench-password");
    let salt = [7u8; SALT_SIZE];
    derive_key(
        divan::black_box(&password),
        divan::black_box(&salt),
        &KdfParams::default(),
    )
    .unwrap()
}

fn main() {
    divan::main();
}
