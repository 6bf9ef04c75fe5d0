//! TGA decoding integration tests.
//!
//! Images are built with the writer in `common` and decoded both from memory
//! and from disk. The `image` crate's decoder serves as an independent
//! reference for pixel data, channel order and RLE packets. It reads the
//! row-order bit with the opposite meaning, so it is fed the same file with
//! that bit toggled.

mod common;

use rstest::rstest;

use common::{
    encode_packets, encode_rle, encode_uncompressed, flip_row_order_bit, header, init_logging,
    to_file_order, write_file, Packet, TestImage, BOTTOM_TO_TOP,
};
use texmesh::image::ImageError;
use texmesh::{decode_targa, load_targa, MipmapError, PixelBuffer};

fn decode(bytes: &[u8]) -> PixelBuffer {
    decode_targa(bytes).expect("decode failed")
}

// ============================================================================
// Channel and Row Order
// ============================================================================

#[rstest]
#[case::rgb(3)]
#[case::rgba(4)]
fn test_channels_reordered_to_rgb(#[case] bytes_per_pixel: usize) {
    init_logging();
    let image = TestImage::pattern(5, 3, bytes_per_pixel);
    let decoded = decode(&encode_uncompressed(&image, false));

    assert_eq!(decoded.width(), 5);
    assert_eq!(decoded.height(), 3);
    assert_eq!(decoded.bytes_per_pixel(), bytes_per_pixel as u32);
    assert_eq!(decoded.data(), image.pixels.as_slice());
}

#[test]
fn test_known_bgr_triples() {
    let mut bytes = header(2, 2, 2, 24, 0);
    for bgr in [[255, 0, 0], [0, 255, 0], [0, 0, 255], [10, 20, 30]] {
        bytes.extend_from_slice(&bgr);
    }
    let decoded = decode(&bytes);
    assert_eq!(
        decoded.data(),
        &[0, 0, 255, 0, 255, 0, 255, 0, 0, 30, 20, 10]
    );
}

#[rstest]
#[case::gray(1)]
#[case::rgb(3)]
#[case::rgba(4)]
fn test_row_order_independent(#[case] bytes_per_pixel: usize) {
    let image = TestImage::pattern(7, 4, bytes_per_pixel);

    let top_down = decode(&encode_uncompressed(&image, false));
    let bottom_up = decode(&encode_uncompressed(&image, true));
    assert_eq!(top_down, bottom_up);

    let top_down = decode(&encode_rle(&image, false));
    let bottom_up = decode(&encode_rle(&image, true));
    assert_eq!(top_down, bottom_up);
    assert_eq!(top_down.data(), image.pixels.as_slice());
}

// ============================================================================
// Run-Length Encoding
// ============================================================================

#[rstest]
#[case::gray(1, false)]
#[case::gray_bottom_up(1, true)]
#[case::rgb(3, false)]
#[case::rgb_bottom_up(3, true)]
#[case::rgba(4, false)]
#[case::rgba_bottom_up(4, true)]
fn test_rle_matches_uncompressed(#[case] bytes_per_pixel: usize, #[case] bottom_up: bool) {
    let image = TestImage::pattern(16, 9, bytes_per_pixel);
    let raw = decode(&encode_uncompressed(&image, bottom_up));
    let rle = decode(&encode_rle(&image, bottom_up));
    assert_eq!(raw.data(), rle.data());
}

#[test]
fn test_rle_run_spans_row_boundary() {
    // width 4: two raw pixels, then a run of 6 covering columns 2..4 and the
    // whole second row
    let a = [1u8, 2, 3];
    let b = [4u8, 5, 6];
    let c = [7u8, 8, 9];
    let packets = [
        Packet::Raw(vec![a.to_vec(), b.to_vec()]),
        Packet::Run(6, c.to_vec()),
    ];
    let bytes = encode_packets(10, 4, 2, 24, 0, &packets);
    let decoded = decode(&bytes);

    let rgb = |p: [u8; 3]| [p[2], p[1], p[0]];
    let mut expected = Vec::new();
    expected.extend_from_slice(&rgb(a));
    expected.extend_from_slice(&rgb(b));
    for _ in 0..6 {
        expected.extend_from_slice(&rgb(c));
    }
    assert_eq!(decoded.data(), expected.as_slice());
    assert_eq!(decoded.pixel(0, 1), Some(&rgb(c)[..]));
}

#[test]
fn test_rle_raw_packet_spans_row_boundary_bottom_up() {
    let pixels: Vec<Vec<u8>> = (0..6u8).map(|v| vec![v * 10]).collect();
    let bytes = encode_packets(11, 3, 2, 8, BOTTOM_TO_TOP, &[Packet::Raw(pixels)]);
    let decoded = decode(&bytes);
    // first stored row is the bottom one
    assert_eq!(decoded.data(), &[30, 40, 50, 0, 10, 20]);
}

#[test]
fn test_rle_packet_past_end_is_rejected() {
    let bytes = encode_packets(
        10,
        2,
        2,
        24,
        0,
        &[Packet::Run(3, vec![0, 0, 0]), Packet::Run(2, vec![1, 1, 1])],
    );
    assert!(matches!(
        decode_targa(&bytes),
        Err(ImageError::RleOverflow {
            position: 3,
            count: 2,
            total: 4
        })
    ));
}

#[test]
fn test_rle_missing_packets_is_overrun() {
    let bytes = encode_packets(11, 4, 4, 8, 0, &[Packet::Run(8, vec![5])]);
    assert!(matches!(
        decode_targa(&bytes),
        Err(ImageError::DecodeOverrun { .. })
    ));
}

// ============================================================================
// Rejection
// ============================================================================

#[rstest]
#[case::color_mapped(1)]
#[case::rle_color_mapped(9)]
#[case::no_image(0)]
#[case::huffman(32)]
fn test_unsupported_image_types(#[case] image_type: u8) {
    let mut bytes = header(image_type, 2, 2, 8, 0);
    bytes.extend_from_slice(&[0; 64]);
    assert!(matches!(
        decode_targa(&bytes),
        Err(ImageError::UnsupportedFormat(_))
    ));
}

#[rstest]
#[case::bits_15(15)]
#[case::bits_16(16)]
#[case::bits_0(0)]
fn test_unsupported_bit_depths(#[case] bits: u8) {
    let mut bytes = header(2, 2, 2, bits, 0);
    bytes.extend_from_slice(&[0; 64]);
    assert!(matches!(
        decode_targa(&bytes),
        Err(ImageError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_empty_input() {
    assert!(matches!(
        decode_targa(&[]),
        Err(ImageError::DecodeOverrun {
            offset: 0,
            needed: 1,
            available: 0
        })
    ));
}

#[test]
fn test_truncated_id_field() {
    let mut bytes = header(3, 1, 1, 8, 0);
    bytes[0] = 200;
    bytes.extend_from_slice(&[0; 10]);
    assert!(matches!(
        decode_targa(&bytes),
        Err(ImageError::DecodeOverrun { .. })
    ));
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_load_from_disk() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let image = TestImage::pattern(8, 8, 3);
    let path = write_file(dir.path(), "pattern.tga", &encode_rle(&image, true));

    let decoded = load_targa(&path).unwrap();
    assert_eq!(decoded.data(), image.pixels.as_slice());
}

#[test]
fn test_load_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.tga");

    match load_targa(&path) {
        Err(ImageError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn test_decode_then_mipmap() {
    let image = TestImage::pattern(16, 8, 4);
    let mut decoded = decode(&encode_uncompressed(&image, true));

    assert_eq!(decoded.generate_mipmaps(1), Ok(3));
    let last = decoded.mip_level(3).unwrap();
    assert_eq!((last.width, last.height), (2, 1));
    assert_eq!(decoded.generate_mipmaps(1), Err(MipmapError::AlreadyGenerated));
}

// ============================================================================
// Reference Decoder
// ============================================================================

fn reference_decode(bytes: &[u8], bytes_per_pixel: usize) -> Vec<u8> {
    let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Tga)
        .expect("reference decoder failed");
    match bytes_per_pixel {
        1 => decoded.into_luma8().into_raw(),
        3 => decoded.into_rgb8().into_raw(),
        _ => decoded.into_rgba8().into_raw(),
    }
}

#[rstest]
#[case::gray(1, false, false)]
#[case::rgb(3, false, false)]
#[case::rgba(4, false, false)]
#[case::rgb_bottom_up(3, true, false)]
#[case::gray_rle(1, false, true)]
#[case::rgb_rle(3, true, true)]
#[case::rgba_rle(4, true, true)]
fn test_matches_reference_decoder(
    #[case] bytes_per_pixel: usize,
    #[case] bottom_up: bool,
    #[case] rle: bool,
) {
    let image = TestImage::pattern(12, 6, bytes_per_pixel);
    let bytes = if rle {
        encode_rle(&image, bottom_up)
    } else {
        encode_uncompressed(&image, bottom_up)
    };

    let ours = decode(&bytes);
    assert_eq!(ours.data(), image.pixels.as_slice());

    let reference = reference_decode(&flip_row_order_bit(&bytes), bytes_per_pixel);
    assert_eq!(ours.data(), reference.as_slice());
}

#[rstest]
#[case::bottom_up(BOTTOM_TO_TOP, [2, 1])]
#[case::top_down(0, [1, 2])]
fn test_row_order_bit(#[case] descriptor: u8, #[case] expected: [u8; 2]) {
    let mut bytes = header(3, 1, 2, 8, descriptor);
    bytes.extend_from_slice(&[1, 2]);
    assert_eq!(decode(&bytes).data(), &expected);
}

#[test]
fn test_file_order_helper() {
    assert_eq!(to_file_order(&[1, 2, 3, 4]), vec![3, 2, 1, 4]);
    assert_eq!(to_file_order(&[9]), vec![9]);
}
