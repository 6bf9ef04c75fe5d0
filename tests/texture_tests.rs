//! Texture loading and caching integration tests.

mod common;

use rstest::rstest;

use common::{encode_rle, encode_uncompressed, init_logging, write_file, TestImage};
use texmesh::backend::{FailurePoint, TextureFormat};
use texmesh::image::ImageError;
use texmesh::{load_texture, DummyBackend, TextureCache, TextureConfig, TextureError};

#[rstest]
#[case::gray(1, TextureFormat::R8)]
#[case::rgb(3, TextureFormat::Rgb8)]
#[case::rgba(4, TextureFormat::Rgba8)]
fn test_load_texture_with_mipmaps(#[case] bytes_per_pixel: usize, #[case] format: TextureFormat) {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let image = TestImage::pattern(16, 4, bytes_per_pixel);
    let path = write_file(dir.path(), "tex.tga", &encode_rle(&image, true));

    let mut backend = DummyBackend::new();
    let texture = load_texture(&mut backend, &path, &TextureConfig::default()).unwrap();

    assert_eq!(texture.format(), format);
    assert_eq!((texture.width(), texture.height()), (16, 4));
    assert_eq!(texture.mip_levels(), 3);
    assert_eq!(texture.label(), Some("tex.tga"));

    let state = backend.texture(texture.handle()).unwrap();
    assert_eq!(state.levels[0].as_deref(), Some(image.pixels.as_slice()));
    assert!(state.levels.iter().all(Option::is_some));

    texture.release(&mut backend);
    assert_eq!(backend.live_textures(), 0);
}

#[test]
fn test_min_mip_size_limits_chain() {
    let dir = tempfile::tempdir().unwrap();
    let image = TestImage::pattern(32, 32, 3);
    let path = write_file(dir.path(), "big.tga", &encode_uncompressed(&image, false));

    let mut backend = DummyBackend::new();
    let config = TextureConfig::default().with_min_mip_size(8);
    let texture = load_texture(&mut backend, &path, &config).unwrap();
    assert_eq!(texture.mip_levels(), 3);
    texture.release(&mut backend);
}

#[test]
fn test_mipmaps_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let image = TestImage::pattern(8, 8, 4);
    let path = write_file(dir.path(), "flat.tga", &encode_uncompressed(&image, true));

    let mut backend = DummyBackend::new();
    let config = TextureConfig::default().with_mipmaps(false);
    let texture = load_texture(&mut backend, &path, &config).unwrap();
    assert_eq!(texture.mip_levels(), 1);
    texture.release(&mut backend);
}

#[test]
fn test_non_power_of_two_uploads_one_level() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let image = TestImage::pattern(10, 6, 3);
    let path = write_file(dir.path(), "npot.tga", &encode_uncompressed(&image, true));

    let mut backend = DummyBackend::new();
    let texture = load_texture(&mut backend, &path, &TextureConfig::default()).unwrap();
    assert_eq!(texture.mip_levels(), 1);
    texture.release(&mut backend);
}

#[test]
fn test_decode_error_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "broken.tga", &[0, 0, 1, 0, 0]);

    let mut backend = DummyBackend::new();
    let result = load_texture(&mut backend, &path, &TextureConfig::default());
    assert!(matches!(
        result,
        Err(TextureError::Image(ImageError::DecodeOverrun { .. }))
    ));
    assert_eq!(backend.live_textures(), 0);
}

// ============================================================================
// Texture Cache
// ============================================================================

#[test]
fn test_cache_loads_once() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let image = TestImage::pattern(4, 4, 3);
    write_file(dir.path(), "a.tga", &encode_uncompressed(&image, false));
    write_file(dir.path(), "b.tga", &encode_rle(&image, false));

    let mut backend = DummyBackend::new();
    let mut cache = TextureCache::new(TextureConfig::default().with_root_dir(dir.path()));

    let first = cache.get(&mut backend, "a.tga").unwrap().handle();
    let again = cache.get(&mut backend, "a.tga").unwrap().handle();
    assert_eq!(first, again);
    assert_eq!(backend.live_textures(), 1);

    let other = cache.get(&mut backend, "b.tga").unwrap().handle();
    assert_ne!(first, other);
    assert_eq!(cache.len(), 2);
    assert!(cache.contains("b.tga"));

    cache.release_all(&mut backend);
    assert!(cache.is_empty());
    assert_eq!(backend.live_textures(), 0);
    assert_eq!(backend.invalid_releases(), 0);
}

#[test]
fn test_cache_retries_failed_loads() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = DummyBackend::new();
    let mut cache = TextureCache::new(TextureConfig::default().with_root_dir(dir.path()));

    assert!(matches!(
        cache.get(&mut backend, "late.tga"),
        Err(TextureError::Image(ImageError::Io { .. }))
    ));
    assert!(!cache.contains("late.tga"));

    write_file(dir.path(), "late.tga", &encode_uncompressed(&TestImage::pattern(2, 2, 1), false));
    assert!(cache.get(&mut backend, "late.tga").is_ok());
    assert_eq!(cache.len(), 1);

    cache.release_all(&mut backend);
}

#[test]
fn test_cache_upload_failure_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "t.tga", &encode_uncompressed(&TestImage::pattern(2, 2, 4), false));

    let mut backend = DummyBackend::new();
    backend.fail_at(FailurePoint::Texture);
    let mut cache = TextureCache::new(TextureConfig::default().with_root_dir(dir.path()));

    assert!(matches!(
        cache.get(&mut backend, "t.tga"),
        Err(TextureError::Backend(_))
    ));
    assert!(cache.is_empty());
    assert_eq!(backend.live_textures(), 0);
}
