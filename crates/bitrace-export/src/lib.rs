//! bitrace-export: Pure format serializers (sans-IO)
//!
//! Converts traced shapes into SVG documents: a filled rendering of the
//! fitted outlines, and a pixel-space overlay of the contours and
//! polygons they were built from.

pub mod svg;

pub use svg::{SvgMetadata, build_path_data, to_overlay_svg, to_svg};
