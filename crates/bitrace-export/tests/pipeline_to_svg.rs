//! Integration test: run synthesized PNG images through the full
//! pipeline and export to SVG.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bitrace_pipeline::{ContourKind, CurveParams, Fill, PathCommand, PipelineConfig, Viewport};

/// Encode ASCII art as a black-on-white PNG (`#` is black).
fn art_png(rows: &[&str]) -> Vec<u8> {
    let width = u32::try_from(rows[0].len()).unwrap();
    let height = u32::try_from(rows.len()).unwrap();
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        if rows[y as usize].as_bytes()[x as usize] == b'#' {
            image::Rgba([0, 0, 0, 255])
        } else {
            image::Rgba([255, 255, 255, 255])
        }
    });
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(
        encoder,
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgba8,
    )
    .unwrap();
    buf
}

#[test]
fn ring_with_hole_exports_two_filled_paths() {
    let png = art_png(&[
        "........",
        ".######.",
        ".######.",
        ".##..##.",
        ".##..##.",
        ".######.",
        ".######.",
        "........",
    ]);
    let config = PipelineConfig::default();
    let result = bitrace_pipeline::process(&png, &config).expect("pipeline should succeed");

    assert_eq!(result.outer_contours.len(), 1);
    assert_eq!(result.inner_contours.len(), 1);
    assert_eq!(result.shapes.len(), 2);
    assert_eq!(result.shapes[0].kind, ContourKind::Outer);
    assert_eq!(result.shapes[0].fill, Fill::Foreground);
    assert_eq!(result.shapes[1].kind, ContourKind::Inner);
    assert_eq!(result.shapes[1].fill, Fill::Background);

    let config_json = serde_json::to_string(&config).unwrap();
    let meta = bitrace_export::SvgMetadata {
        title: Some("ring"),
        description: Some("integration test"),
        config_json: Some(&config_json),
    };
    let svg = bitrace_export::to_svg(&result, &meta);

    assert!(svg.contains("<svg"));
    assert!(svg.contains(r#"viewBox="0 0 100 100""#));
    assert_eq!(svg.matches("<path").count(), 2);
    assert!(svg.contains(r#"fill="black""#));
    assert!(svg.contains("</svg>"));

    let overlay = bitrace_export::to_overlay_svg(&result, &bitrace_export::SvgMetadata::default());
    assert!(overlay.contains(r#"viewBox="0 0 8 8""#));
    // Two contours plus two polygons.
    assert_eq!(overlay.matches("<path").count(), 4);
}

#[test]
fn every_path_stays_inside_the_viewport() {
    let png = art_png(&["#...##", ".#..##", "..#...", "###.#."]);
    let config = PipelineConfig {
        viewport: Viewport {
            width: 60.0,
            height: 40.0,
        },
        ..PipelineConfig::default()
    };
    let result = bitrace_pipeline::process(&png, &config).unwrap();
    assert!(!result.shapes.is_empty());
    for shape in &result.shapes {
        for command in &shape.commands {
            let points: Vec<_> = match *command {
                PathCommand::MoveTo(p) => vec![p],
                PathCommand::LineTo(a, b) => vec![a, b],
                PathCommand::CurveTo(a, b, c) => vec![a, b, c],
            };
            for p in points {
                assert!((0.0..=60.0).contains(&p.x), "{p:?}");
                assert!((0.0..=40.0).contains(&p.y), "{p:?}");
            }
        }
    }
}

#[test]
fn refitting_changes_paths_but_not_polygons() {
    let png = art_png(&["......", ".####.", ".####.", ".####.", ".####.", "......"]);
    let fitted = bitrace_pipeline::Pipeline::new(png, PipelineConfig::default())
        .decode()
        .unwrap()
        .trace()
        .unwrap()
        .optimize()
        .into_fitted()
        .unwrap();
    let smooth = fitted.shapes().to_vec();
    let sharp = fitted
        .refit(CurveParams {
            minimum_angle: 0.1,
            maximum_angle: 0.2,
            factor: 1.0,
        })
        .unwrap();
    assert_ne!(sharp.shapes(), smooth.as_slice());
    let result = sharp.into_result();
    assert_eq!(result.outer_polygons[0].vertices().len(), 4);
    let svg = bitrace_export::to_svg(&result, &bitrace_export::SvgMetadata::default());
    assert!(svg.contains(" L"));
    assert!(!svg.contains(" C"));
}
