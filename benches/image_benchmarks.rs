use criterion::{black_box, criterion_group, criterion_main, Criterion};

use texmesh::{decode_targa, PixelBuffer};

const SIZE: u16 = 256;

fn tga_header(image_type: u8, bits: u8) -> Vec<u8> {
    let mut bytes = vec![0u8, 0, image_type, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    bytes.extend_from_slice(&SIZE.to_le_bytes());
    bytes.extend_from_slice(&SIZE.to_le_bytes());
    bytes.push(bits);
    bytes.push(0);
    bytes
}

fn uncompressed_rgba() -> Vec<u8> {
    let mut bytes = tga_header(2, 32);
    let pixels = SIZE as usize * SIZE as usize;
    bytes.extend((0..pixels * 4).map(|i| (i * 13 % 251) as u8));
    bytes
}

/// Alternating runs of 16 identical pixels and raw packets of 16 pixels.
fn rle_rgb() -> Vec<u8> {
    let mut bytes = tga_header(10, 24);
    let pixels = SIZE as usize * SIZE as usize;
    let mut written = 0;
    let mut run = true;
    while written < pixels {
        if run {
            bytes.push(0x80 + 15);
            bytes.extend_from_slice(&[(written % 256) as u8, 64, 128]);
        } else {
            bytes.push(15);
            bytes.extend((0..16 * 3).map(|i| ((written + i) % 256) as u8));
        }
        written += 16;
        run = !run;
    }
    bytes
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn bench_decode_uncompressed(c: &mut Criterion) {
    let bytes = uncompressed_rgba();
    c.bench_function("targa_decode_256_rgba", |b| {
        b.iter(|| decode_targa(black_box(&bytes)).unwrap());
    });
}

fn bench_decode_rle(c: &mut Criterion) {
    let bytes = rle_rgb();
    c.bench_function("targa_decode_256_rle_rgb", |b| {
        b.iter(|| decode_targa(black_box(&bytes)).unwrap());
    });
}

// ---------------------------------------------------------------------------
// Mipmaps
// ---------------------------------------------------------------------------

fn bench_mipmaps(c: &mut Criterion) {
    let base = decode_targa(&uncompressed_rgba()).unwrap();
    c.bench_function("mipmap_chain_256_rgba", |b| {
        b.iter_batched(
            || base.clone(),
            |mut image: PixelBuffer| {
                image.generate_mipmaps(1).unwrap();
                black_box(image)
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_decode_uncompressed,
    bench_decode_rle,
    bench_mipmaps
);
criterion_main!(benches);
