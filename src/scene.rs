//! Scene Model - Primitives In Stacking Order
//!
//! A Scene is built by exactly one generator call and handed to the
//! serializer read-only. Insertion order is render order.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a fill or stroke is painted with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "value")]
pub enum Paint {
    #[default]
    None,
    Color(Color),
    /// Reference to a [`GradientDefinition`] id in the same scene
    Gradient(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub fill: Paint,
    #[serde(default)]
    pub fill_opacity: Option<f64>,
    #[serde(default)]
    pub stroke: Paint,
    #[serde(default)]
    pub stroke_width: Option<f64>,
}

impl Style {
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Paint::Color(color),
            ..Self::default()
        }
    }

    pub fn translucent(color: Color, opacity: f64) -> Self {
        Self {
            fill: Paint::Color(color),
            fill_opacity: Some(opacity),
            ..Self::default()
        }
    }

    /// Stroke-only outline; fill is explicitly `none`.
    pub fn stroked(color: Color, width: f64) -> Self {
        Self {
            fill: Paint::None,
            fill_opacity: None,
            stroke: Paint::Color(color),
            stroke_width: Some(width),
        }
    }

    pub fn gradient(id: impl Into<String>) -> Self {
        Self {
            fill: Paint::Gradient(id.into()),
            ..Self::default()
        }
    }

    fn gradient_refs(&self) -> impl Iterator<Item = &str> {
        [&self.fill, &self.stroke].into_iter().filter_map(|p| match p {
            Paint::Gradient(id) => Some(id.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient vector, in [0, 1]
    pub offset: f64,
    pub color: Color,
}

/// Linear gradient in object bounding-box units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientDefinition {
    pub id: String,
    pub from: Point,
    pub to: Point,
    pub stops: Vec<GradientStop>,
}

impl GradientDefinition {
    /// Corner-to-corner gradient between two colors.
    pub fn diagonal(id: impl Into<String>, start: Color, end: Color) -> Self {
        Self {
            id: id.into(),
            from: Point::new(0.0, 0.0),
            to: Point::new(1.0, 1.0),
            stops: vec![
                GradientStop { offset: 0.0, color: start },
                GradientStop { offset: 1.0, color: end },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Background,
    Rectangle,
    Circle,
    Polygon,
    Polyline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Primitive {
    /// Opaque fill over the whole canvas
    Background { paint: Paint },
    Rectangle { x: f64, y: f64, width: f64, height: f64, style: Style },
    Circle { cx: f64, cy: f64, r: f64, style: Style },
    Polygon { points: Vec<Point>, style: Style },
    Polyline { points: Vec<Point>, style: Style },
}

/// Axis-aligned extent of a primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn within(&self, size: f64) -> bool {
        self.min_x >= 0.0 && self.min_y >= 0.0 && self.max_x <= size && self.max_y <= size
    }

    fn of_points(points: &[Point]) -> Self {
        points.iter().fold(
            Bounds {
                min_x: f64::INFINITY,
                min_y: f64::INFINITY,
                max_x: f64::NEG_INFINITY,
                max_y: f64::NEG_INFINITY,
            },
            |b, p| Bounds {
                min_x: b.min_x.min(p.x),
                min_y: b.min_y.min(p.y),
                max_x: b.max_x.max(p.x),
                max_y: b.max_y.max(p.y),
            },
        )
    }
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Background { .. } => PrimitiveKind::Background,
            Primitive::Rectangle { .. } => PrimitiveKind::Rectangle,
            Primitive::Circle { .. } => PrimitiveKind::Circle,
            Primitive::Polygon { .. } => PrimitiveKind::Polygon,
            Primitive::Polyline { .. } => PrimitiveKind::Polyline,
        }
    }

    /// Geometric extent on a canvas of side `size`.
    pub fn bounds(&self, size: f64) -> Bounds {
        match self {
            Primitive::Background { .. } => Bounds { min_x: 0.0, min_y: 0.0, max_x: size, max_y: size },
            Primitive::Rectangle { x, y, width, height, .. } => Bounds {
                min_x: *x,
                min_y: *y,
                max_x: x + width,
                max_y: y + height,
            },
            Primitive::Circle { cx, cy, r, .. } => Bounds {
                min_x: cx - r,
                min_y: cy - r,
                max_x: cx + r,
                max_y: cy + r,
            },
            Primitive::Polygon { points, .. } | Primitive::Polyline { points, .. } => {
                Bounds::of_points(points)
            }
        }
    }

    fn gradient_refs(&self) -> Vec<&str> {
        match self {
            Primitive::Background { paint } => match paint {
                Paint::Gradient(id) => vec![id.as_str()],
                _ => vec![],
            },
            Primitive::Rectangle { style, .. }
            | Primitive::Circle { style, .. }
            | Primitive::Polygon { style, .. }
            | Primitive::Polyline { style, .. } => style.gradient_refs().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Canvas side length (width == height)
    pub size: u32,
    pub primitives: Vec<Primitive>,
    pub gradients: Vec<GradientDefinition>,
}

impl Scene {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            primitives: vec![],
            gradients: vec![],
        }
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    /// Register a gradient. The first definition of an id wins.
    pub fn define_gradient(&mut self, gradient: GradientDefinition) -> String {
        let id = gradient.id.clone();
        if self.gradient(&id).is_none() {
            self.gradients.push(gradient);
        }
        id
    }

    pub fn gradient(&self, id: &str) -> Option<&GradientDefinition> {
        self.gradients.iter().find(|g| g.id == id)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Gradient ids referenced by primitives but never defined.
    pub fn undefined_gradients(&self) -> Vec<String> {
        let mut missing: Vec<String> = vec![];
        for id in self.primitives.iter().flat_map(Primitive::gradient_refs) {
            if self.gradient(id).is_none() && !missing.iter().any(|m| m == id) {
                missing.push(id.to_string());
            }
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_display() {
        assert_eq!(Color::rgb(1, 22, 255).to_string(), "rgb(1,22,255)");
    }

    #[test]
    fn test_first_gradient_definition_wins() {
        let mut scene = Scene::new(10);
        scene.define_gradient(GradientDefinition::diagonal("g", Color::BLACK, Color::WHITE));
        scene.define_gradient(GradientDefinition::diagonal("g", Color::WHITE, Color::BLACK));
        assert_eq!(scene.gradients.len(), 1);
        assert_eq!(scene.gradient("g").unwrap().stops[0].color, Color::BLACK);
    }

    #[test]
    fn test_undefined_gradients_reported_once() {
        let mut scene = Scene::new(10);
        for _ in 0..2 {
            scene.push(Primitive::Rectangle {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
                style: Style::gradient("missing"),
            });
        }
        assert_eq!(scene.undefined_gradients(), vec!["missing".to_string()]);
    }

    #[test]
    fn test_polygon_bounds() {
        let p = Primitive::Polygon {
            points: vec![Point::new(1.0, 5.0), Point::new(4.0, 2.0), Point::new(3.0, 9.0)],
            style: Style::filled(Color::BLACK),
        };
        let b = p.bounds(10.0);
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (1.0, 2.0, 4.0, 9.0));
        assert!(b.within(10.0));
    }
}
