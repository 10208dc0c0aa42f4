use image::{DynamicImage, Rgb, RgbImage};
use photo_report::*;
use std::sync::Arc;

fn options(photos_per_page: PhotosPerPage) -> ReportOptions {
    ReportOptions {
        photos_per_page,
        ..Default::default()
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 3 % 256) as u8, (y * 5 % 256) as u8, 60])
    }));
    let mut buf = std::io::Cursor::new(Vec::new());
    image.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

#[test]
fn test_stats_no_photos() {
    match calculate_statistics(0, &options(PhotosPerPage::Two)) {
        Err(ReportError::EmptyReport) => {}
        _ => panic!("Expected EmptyReport error"),
    }
}

#[test]
fn test_stats_odd_count_two_per_page() {
    let stats = calculate_statistics(5, &options(PhotosPerPage::Two)).unwrap();
    assert_eq!(stats.photos, 5);
    assert_eq!(stats.photos_per_page, 2);
    assert_eq!(stats.pages, 3);
    assert_eq!(stats.photos_on_last_page, 1);
    assert_eq!(stats.empty_slots, 1);
}

#[test]
fn test_stats_even_count_two_per_page() {
    let stats = calculate_statistics(4, &options(PhotosPerPage::Two)).unwrap();
    assert_eq!(stats.pages, 2);
    assert_eq!(stats.photos_on_last_page, 2);
    assert_eq!(stats.empty_slots, 0);
}

#[test]
fn test_stats_one_per_page() {
    let stats = calculate_statistics(7, &options(PhotosPerPage::One)).unwrap();
    assert_eq!(stats.pages, 7);
    assert_eq!(stats.photos_on_last_page, 1);
    assert_eq!(stats.empty_slots, 0);
}

#[tokio::test]
async fn test_compression_summary() {
    let codec = Arc::new(RasterCodec::new());
    let mut session = ReportSession::new();
    session.ingest(&codec, "grande.png", png(2400, 1200)).await.unwrap();
    session.ingest(&codec, "pequena.png", png(300, 200)).await.unwrap();

    let document = ReportAssembler::new(codec, options(PhotosPerPage::Two))
        .assemble(session.items())
        .await
        .unwrap();

    let dimensions: Vec<(u32, u32)> = session
        .items()
        .iter()
        .map(|item| (item.source.width, item.source.height))
        .collect();
    let summary = summarize_compression(&document, &dimensions);

    let sizes: Vec<usize> = document.photos().map(|p| p.image.byte_size()).collect();
    assert_eq!(summary.total_bytes, sizes.iter().sum::<usize>());
    assert_eq!(summary.largest_bytes, *sizes.iter().max().unwrap());
    assert_eq!(summary.budget_unmet, 0);
    // Only the photo above the 2000 px cap is resized
    assert_eq!(summary.downscaled, 1);
    assert!(summary.average_quality >= 0.3 && summary.average_quality <= 0.95);
}
