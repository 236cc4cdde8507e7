//! SVG export serializer.
//!
//! Uses the [`svg`] crate for document construction, XML escaping, and
//! path data formatting. Every function here is pure and returns a
//! `String`.
//!
//! [`to_svg`] emits one filled `<path>` per shape in discovery order.
//! Outer shapes are painted black and holes white on top of them, so
//! the document must not be reordered.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Element, Group, Path, Rectangle, Title};
use svg::node::{Node, Text, Value};

use bitrace_pipeline::{Fill, PathCommand, PixelPoint, VectorResult};

/// Namespace of the `<bitrace:config>` metadata element.
const METADATA_NAMESPACE: &str = "urn:bitrace:config:1";

/// Metadata to embed in the SVG document.
///
/// When present, `<title>`, `<desc>`, and `<metadata>` elements are
/// emitted immediately after the opening `<svg>` tag. Text values are
/// XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename without extension.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized pipeline configuration, wrapped in a namespaced
    /// `<bitrace:config>` element inside `<metadata>`.
    pub config_json: Option<&'a str>,
}

/// Build an SVG path `d` attribute string from path commands.
///
/// The path is closed with `z`. Each [`PathCommand::LineTo`] emits one
/// `L` command carrying both of its points. Returns an empty string for
/// an empty command list.
///
/// # Examples
///
/// ```
/// use bitrace_pipeline::{PathCommand, Point};
/// use bitrace_export::build_path_data;
///
/// let commands = [
///     PathCommand::MoveTo(Point::new(10.0, 20.0)),
///     PathCommand::LineTo(Point::new(10.0, 20.0), Point::new(30.0, 40.0)),
/// ];
/// let d = build_path_data(&commands);
/// assert!(d.starts_with("M10,20 L10,20,30,40"));
/// ```
#[must_use]
pub fn build_path_data(commands: &[PathCommand]) -> String {
    if commands.is_empty() {
        return String::new();
    }
    let mut data = Data::new();
    for command in commands {
        data = match *command {
            PathCommand::MoveTo(p) => data.move_to((p.x, p.y)),
            PathCommand::LineTo(a, b) => data.line_to((a.x, a.y, b.x, b.y)),
            PathCommand::CurveTo(c1, c2, end) => {
                data.cubic_curve_to((c1.x, c1.y, c2.x, c2.y, end.x, end.y))
            }
        };
    }
    String::from(Value::from(data.close()))
}

/// Closed `M`/`L` outline through grid points, in pixel space.
fn grid_path_data(points: &[PixelPoint]) -> String {
    let Some((first, rest)) = points.split_first() else {
        return String::new();
    };
    let mut data = Data::new().move_to((first.x, first.y));
    for p in rest {
        data = data.line_to((p.x, p.y));
    }
    String::from(Value::from(data.close()))
}

/// Append `<title>`, `<desc>`, and `<metadata>` as requested.
fn add_metadata(mut doc: Document, metadata: &SvgMetadata<'_>) -> Document {
    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }
    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("bitrace:config");
        config_el.assign("xmlns:bitrace", METADATA_NAMESPACE);
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }
    doc
}

/// Prepend the XML declaration, which the `svg` crate omits.
fn finish(doc: &Document) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

/// Serialize fitted shapes into a filled SVG document.
///
/// The document scales to its container (`width="100%"`,
/// `height="100%"`) and its `viewBox` is the result's viewport. A white
/// background rectangle comes first, then one `<path>` per shape with
/// `fill="black"` for outer shapes and `fill="white"` for holes.
///
/// # Examples
///
/// ```
/// use bitrace_pipeline::{Bitmap, PipelineConfig, vectorize};
/// use bitrace_export::{SvgMetadata, to_svg};
///
/// let bitmap = Bitmap::new(3, 3, vec![
///     false, false, false,
///     false, true, false,
///     false, false, false,
/// ]).unwrap();
/// let result = vectorize(&bitmap, &PipelineConfig::default()).unwrap();
/// let meta = SvgMetadata { title: Some("dot"), ..SvgMetadata::default() };
/// let svg = to_svg(&result, &meta);
/// assert!(svg.contains("<title>dot</title>"));
/// assert!(svg.contains(r#"fill="black""#));
/// ```
#[must_use]
pub fn to_svg(result: &VectorResult, metadata: &SvgMetadata<'_>) -> String {
    let viewport = result.viewport;
    let doc = Document::new()
        .set("width", "100%")
        .set("height", "100%")
        .set("viewBox", (0.0, 0.0, viewport.width, viewport.height));
    let mut doc = add_metadata(doc, metadata);

    doc = doc.add(
        Rectangle::new()
            .set("width", viewport.width)
            .set("height", viewport.height)
            .set("fill", "white"),
    );

    for shape in &result.shapes {
        let d = build_path_data(&shape.commands);
        if d.is_empty() {
            continue;
        }
        let fill = match shape.fill {
            Fill::Foreground => "black",
            Fill::Background => "white",
        };
        doc = doc.add(
            Path::new()
                .set("d", d)
                .set("fill", fill)
                .set("stroke", "none"),
        );
    }

    finish(&doc)
}

/// Serialize contours and polygons into a pixel-space overlay SVG.
///
/// The `viewBox` is the source bitmap's pixel grid. Contours are drawn
/// as thin blue outlines under `<g id="contours">`, polygons as red
/// outlines with a dot on every vertex under `<g id="polygons">`. The
/// document has no background, so it can be laid over the source image.
#[must_use]
pub fn to_overlay_svg(result: &VectorResult, metadata: &SvgMetadata<'_>) -> String {
    let dims = result.dimensions;
    let doc = Document::new()
        .set("width", dims.width)
        .set("height", dims.height)
        .set("viewBox", (0, 0, dims.width, dims.height));
    let mut doc = add_metadata(doc, metadata);

    let mut contours = Group::new()
        .set("id", "contours")
        .set("fill", "none")
        .set("stroke", "blue")
        .set("stroke-width", 0.1);
    for contour in result.outer_contours.iter().chain(&result.inner_contours) {
        let d = grid_path_data(contour.points());
        if !d.is_empty() {
            contours = contours.add(Path::new().set("d", d));
        }
    }
    doc = doc.add(contours);

    let mut polygons = Group::new()
        .set("id", "polygons")
        .set("fill", "none")
        .set("stroke", "red")
        .set("stroke-width", 0.15);
    for polygon in result.outer_polygons.iter().chain(&result.inner_polygons) {
        let d = grid_path_data(polygon.points());
        if !d.is_empty() {
            polygons = polygons.add(Path::new().set("d", d));
        }
        for v in polygon.vertices() {
            polygons = polygons.add(
                Circle::new()
                    .set("cx", v.x)
                    .set("cy", v.y)
                    .set("r", 0.25)
                    .set("fill", "red")
                    .set("stroke", "none"),
            );
        }
    }
    doc = doc.add(polygons);

    finish(&doc)
}
