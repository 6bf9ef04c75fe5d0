//! Common utilities for integration tests.
//!
//! Provides a small TGA writer so tests can build files byte by byte:
//! uncompressed images, automatically run-length encoded images, and
//! hand-written RLE packet streams.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Descriptor bit for bottom-to-top row order.
pub const BOTTOM_TO_TOP: u8 = 0x20;

/// Install a test logger (idempotent).
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A logical image in output channel order (R,G,B[,A] or gray), rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestImage {
    pub width: u16,
    pub height: u16,
    pub bytes_per_pixel: usize,
    pub pixels: Vec<u8>,
}

impl TestImage {
    /// Image with short runs of repeated pixels and some unique ones.
    pub fn pattern(width: u16, height: u16, bytes_per_pixel: usize) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * bytes_per_pixel);
        for y in 0..height as usize {
            for x in 0..width as usize {
                let run = x / 3;
                for c in 0..bytes_per_pixel {
                    let value = if (x + y) % 5 == 0 {
                        (x * 31 + y * 17 + c * 7) % 256
                    } else {
                        (run * 50 + y * 20 + c * 60) % 256
                    };
                    pixels.push(value as u8);
                }
            }
        }
        Self {
            width,
            height,
            bytes_per_pixel,
            pixels,
        }
    }

    pub fn bits_per_pixel(&self) -> u8 {
        (self.bytes_per_pixel * 8) as u8
    }

    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let start = (y * self.width as usize + x) * self.bytes_per_pixel;
        &self.pixels[start..start + self.bytes_per_pixel]
    }

    fn image_type(&self, rle: bool) -> u8 {
        match (self.bytes_per_pixel == 1, rle) {
            (true, false) => 3,
            (false, false) => 2,
            (true, true) => 11,
            (false, true) => 10,
        }
    }

    fn descriptor(&self, bottom_up: bool) -> u8 {
        let alpha_bits = if self.bytes_per_pixel == 4 { 8 } else { 0 };
        let order = if bottom_up { BOTTOM_TO_TOP } else { 0 };
        alpha_bits | order
    }

    /// Pixels in file order: rows as stored, channels as B,G,R[,A].
    fn file_pixels(&self, bottom_up: bool) -> Vec<Vec<u8>> {
        let rows: Vec<usize> = if bottom_up {
            (0..self.height as usize).rev().collect()
        } else {
            (0..self.height as usize).collect()
        };
        let mut out = Vec::new();
        for y in rows {
            for x in 0..self.width as usize {
                out.push(to_file_order(self.pixel(x, y)));
            }
        }
        out
    }
}

/// Swap R,G,B[,A] to the B,G,R[,A] order TGA stores.
pub fn to_file_order(pixel: &[u8]) -> Vec<u8> {
    let mut out = pixel.to_vec();
    if out.len() >= 3 {
        out.swap(0, 2);
    }
    out
}

/// Build an 18-byte TGA header.
pub fn header(image_type: u8, width: u16, height: u16, bits: u8, descriptor: u8) -> Vec<u8> {
    let mut bytes = vec![0u8, 0, image_type, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    bytes.extend_from_slice(&width.to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes.push(bits);
    bytes.push(descriptor);
    bytes
}

/// Copy of a TGA file with the row-order descriptor bit toggled.
pub fn flip_row_order_bit(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out[17] ^= BOTTOM_TO_TOP;
    out
}

/// Encode without compression.
pub fn encode_uncompressed(image: &TestImage, bottom_up: bool) -> Vec<u8> {
    let mut bytes = header(
        image.image_type(false),
        image.width,
        image.height,
        image.bits_per_pixel(),
        image.descriptor(bottom_up),
    );
    for pixel in image.file_pixels(bottom_up) {
        bytes.extend_from_slice(&pixel);
    }
    bytes
}

/// One RLE packet, with pixels given in file channel order.
#[derive(Debug, Clone)]
pub enum Packet {
    /// `count` copies of one pixel (1..=128).
    Run(usize, Vec<u8>),
    /// Literal pixels (1..=128).
    Raw(Vec<Vec<u8>>),
}

/// Serialize RLE packets after a header.
pub fn encode_packets(
    image_type: u8,
    width: u16,
    height: u16,
    bits: u8,
    descriptor: u8,
    packets: &[Packet],
) -> Vec<u8> {
    let mut bytes = header(image_type, width, height, bits, descriptor);
    for packet in packets {
        match packet {
            Packet::Run(count, pixel) => {
                assert!((1..=128).contains(count));
                bytes.push((count + 127) as u8);
                bytes.extend_from_slice(pixel);
            }
            Packet::Raw(pixels) => {
                assert!((1..=128).contains(&pixels.len()));
                bytes.push((pixels.len() - 1) as u8);
                for pixel in pixels {
                    bytes.extend_from_slice(pixel);
                }
            }
        }
    }
    bytes
}

/// Greedy RLE encoder. Packets freely cross row boundaries.
pub fn rle_packets(pixels: &[Vec<u8>]) -> Vec<Packet> {
    let mut packets = Vec::new();
    let mut raw: Vec<Vec<u8>> = Vec::new();
    let mut i = 0;

    while i < pixels.len() {
        let mut run = 1;
        while i + run < pixels.len() && run < 128 && pixels[i + run] == pixels[i] {
            run += 1;
        }

        if run >= 2 {
            if !raw.is_empty() {
                packets.push(Packet::Raw(std::mem::take(&mut raw)));
            }
            packets.push(Packet::Run(run, pixels[i].clone()));
            i += run;
        } else {
            raw.push(pixels[i].clone());
            if raw.len() == 128 {
                packets.push(Packet::Raw(std::mem::take(&mut raw)));
            }
            i += 1;
        }
    }
    if !raw.is_empty() {
        packets.push(Packet::Raw(raw));
    }
    packets
}

/// Encode with run-length compression.
pub fn encode_rle(image: &TestImage, bottom_up: bool) -> Vec<u8> {
    let packets = rle_packets(&image.file_pixels(bottom_up));
    encode_packets(
        image.image_type(true),
        image.width,
        image.height,
        image.bits_per_pixel(),
        image.descriptor(bottom_up),
        &packets,
    )
}

/// Write bytes to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("failed to write test file");
    path
}
