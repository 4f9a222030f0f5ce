//! SVG Serializer - Scene To Vector Document
//!
//! One element per primitive, in scene order. Gradients are emitted once in
//! `<defs>` and referenced by `url(#id)`.

use base64::Engine;
use std::fmt::Write;
use thiserror::Error;

use crate::scene::{GradientDefinition, Paint, Point, Primitive, Scene, Style};

pub const DATA_URL_PREFIX: &str = "data:image/svg+xml;base64,";

const SVG_NS: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SvgError {
    #[error("Gradient referenced but not defined: {0}")]
    UndefinedGradient(String),

    #[error("Malformed data URL: {0}")]
    MalformedDataUrl(String),
}

/// Render a scene as a standalone SVG document.
pub fn render(scene: &Scene) -> Result<String, SvgError> {
    if let Some(id) = scene.undefined_gradients().into_iter().next() {
        return Err(SvgError::UndefinedGradient(id));
    }

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n");
    let _ = writeln!(
        out,
        r#"<svg xmlns="{ns}" version="1.1" width="{n}" height="{n}" viewBox="0 0 {n} {n}">"#,
        ns = SVG_NS,
        n = scene.size
    );

    if !scene.gradients.is_empty() {
        out.push_str("<defs>\n");
        for gradient in &scene.gradients {
            write_gradient(&mut out, gradient);
        }
        out.push_str("</defs>\n");
    }

    for primitive in &scene.primitives {
        write_primitive(&mut out, primitive, scene.size);
    }

    out.push_str("</svg>\n");
    Ok(out)
}

/// Encode a document as a `data:image/svg+xml;base64,` URL.
pub fn to_data_url(document: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(document.as_bytes());
    format!("{}{}", DATA_URL_PREFIX, encoded)
}

/// Decode a data URL produced by [`to_data_url`].
pub fn from_data_url(url: &str) -> Result<String, SvgError> {
    let payload = url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| SvgError::MalformedDataUrl(format!("missing prefix {}", DATA_URL_PREFIX)))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| SvgError::MalformedDataUrl(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SvgError::MalformedDataUrl(e.to_string()))
}

fn write_gradient(out: &mut String, gradient: &GradientDefinition) {
    let _ = writeln!(
        out,
        r#"<linearGradient id="{}" x1="{}" y1="{}" x2="{}" y2="{}">"#,
        escape(&gradient.id),
        gradient.from.x,
        gradient.from.y,
        gradient.to.x,
        gradient.to.y
    );
    for stop in &gradient.stops {
        let _ = writeln!(out, r#"<stop offset="{}" stop-color="{}" />"#, stop.offset, stop.color);
    }
    out.push_str("</linearGradient>\n");
}

fn write_primitive(out: &mut String, primitive: &Primitive, size: u32) {
    match primitive {
        Primitive::Background { paint } => {
            let _ = writeln!(
                out,
                r#"<rect x="0" y="0" width="{n}" height="{n}" fill="{}" />"#,
                paint_value(paint),
                n = size
            );
        }
        Primitive::Rectangle { x, y, width, height, style } => {
            let _ = writeln!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}"{} />"#,
                x,
                y,
                width,
                height,
                style_attrs(style)
            );
        }
        Primitive::Circle { cx, cy, r, style } => {
            let _ = writeln!(
                out,
                r#"<circle cx="{}" cy="{}" r="{}"{} />"#,
                cx,
                cy,
                r,
                style_attrs(style)
            );
        }
        Primitive::Polygon { points, style } => {
            let _ = writeln!(out, r#"<polygon points="{}"{} />"#, points_attr(points), style_attrs(style));
        }
        Primitive::Polyline { points, style } => {
            let _ = writeln!(out, r#"<polyline points="{}"{} />"#, points_attr(points), style_attrs(style));
        }
    }
}

fn paint_value(paint: &Paint) -> String {
    match paint {
        Paint::None => "none".to_string(),
        Paint::Color(color) => color.to_string(),
        Paint::Gradient(id) => format!("url(#{})", escape(id)),
    }
}

fn style_attrs(style: &Style) -> String {
    let mut attrs = format!(r#" fill="{}""#, paint_value(&style.fill));
    if let Some(opacity) = style.fill_opacity {
        let _ = write!(attrs, r#" fill-opacity="{}""#, opacity);
    }
    if style.stroke != Paint::None {
        let _ = write!(attrs, r#" stroke="{}""#, paint_value(&style.stroke));
    }
    if let Some(width) = style.stroke_width {
        let _ = write!(attrs, r#" stroke-width="{}""#, width);
    }
    attrs
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Color;

    #[test]
    fn test_root_dimensions() {
        let doc = render(&Scene::new(64)).unwrap();
        assert!(doc.contains(r#"width="64" height="64" viewBox="0 0 64 64""#));
        assert!(!doc.contains("<defs>"));
        assert!(doc.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_undefined_gradient_rejected() {
        let mut scene = Scene::new(8);
        scene.push(Primitive::Background { paint: Paint::Gradient("nope".into()) });
        assert_eq!(render(&scene), Err(SvgError::UndefinedGradient("nope".into())));
    }

    #[test]
    fn test_stroke_only_polyline() {
        let mut scene = Scene::new(8);
        scene.push(Primitive::Polyline {
            points: vec![Point::new(0.0, 1.5), Point::new(2.0, 3.0)],
            style: Style::stroked(Color::rgb(1, 2, 3), 1.0),
        });
        let doc = render(&scene).unwrap();
        assert!(doc.contains(
            r#"<polyline points="0,1.5 2,3" fill="none" stroke="rgb(1,2,3)" stroke-width="1" />"#
        ));
    }

    #[test]
    fn test_data_url_prefix_and_decode() {
        let doc = render(&Scene::new(16)).unwrap();
        let url = to_data_url(&doc);
        assert!(url.starts_with(DATA_URL_PREFIX));
        assert!(!url.contains('\n'));
        assert_eq!(from_data_url(&url).unwrap(), doc);
    }

    #[test]
    fn test_data_url_missing_prefix() {
        assert!(matches!(
            from_data_url("data:image/png;base64,AAAA"),
            Err(SvgError::MalformedDataUrl(_))
        ));
        assert!(matches!(
            from_data_url("data:image/svg+xml;base64,***"),
            Err(SvgError::MalformedDataUrl(_))
        ));
    }
}
