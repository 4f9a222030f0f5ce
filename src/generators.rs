//! Generators - One Placement Algorithm Per Style
//!
//! Every generator is a pure function of (canvas size, sampler) to a fresh
//! [`Scene`]. Dispatch is a single exhaustive match on [`Generator`].

use serde::{Deserialize, Serialize};

use crate::sampler::Sampler;
use crate::scene::{Color, GradientDefinition, Paint, Point, Primitive, Scene, Style};

/// The closed set of image generators, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Generator {
    Gradient,
    Geometric,
    LineArt,
    Watercolor,
    Pixel,
    Ornament,
    Biomorphic,
    Cosmic,
    Doodle,
    Stripe,
}

impl Generator {
    pub const ALL: [Generator; 10] = [
        Generator::Gradient,
        Generator::Geometric,
        Generator::LineArt,
        Generator::Watercolor,
        Generator::Pixel,
        Generator::Ornament,
        Generator::Biomorphic,
        Generator::Cosmic,
        Generator::Doodle,
        Generator::Stripe,
    ];

    /// Wire name, as accepted by the cover endpoint.
    pub fn name(self) -> &'static str {
        match self {
            Generator::Gradient => "gradient",
            Generator::Geometric => "geometric",
            Generator::LineArt => "lineArt",
            Generator::Watercolor => "watercolor",
            Generator::Pixel => "pixel",
            Generator::Ornament => "ornament",
            Generator::Biomorphic => "biomorphic",
            Generator::Cosmic => "cosmic",
            Generator::Doodle => "doodle",
            Generator::Stripe => "stripe",
        }
    }

    pub fn generate<S: Sampler>(self, size: u32, sampler: &mut S) -> Scene {
        let mut scene = Scene::new(size);
        let n = f64::from(size);
        match self {
            Generator::Gradient => gradient(&mut scene, n, sampler),
            Generator::Geometric => geometric(&mut scene, n, sampler),
            Generator::LineArt => line_art(&mut scene, size, sampler),
            Generator::Watercolor => watercolor(&mut scene, n, sampler),
            Generator::Pixel => pixel(&mut scene, n, sampler),
            Generator::Ornament => ornament(&mut scene, size, sampler),
            Generator::Biomorphic => biomorphic(&mut scene, n, sampler),
            Generator::Cosmic => cosmic(&mut scene, n, sampler),
            Generator::Doodle => doodle(&mut scene, n, sampler),
            Generator::Stripe => stripe(&mut scene, size, sampler),
        }
        scene
    }
}

pub const GEOMETRIC_SHAPES: usize = 5;
pub const WATERCOLOR_LAYERS: usize = 15;
pub const WATERCOLOR_OPACITY: f64 = 0.2;
pub const PIXEL_GRID: u32 = 8;
pub const ORNAMENT_SPACING: u32 = 20;
pub const ORNAMENT_RADIUS: f64 = 5.0;
pub const BIOMORPHIC_VERTICES: usize = 8;
pub const COSMIC_STARS: usize = 50;
pub const DOODLE_STROKES: usize = 3;
pub const DOODLE_VERTICES: usize = 5;
pub const STRIPE_PERIOD: u32 = 20;
pub const STRIPE_HEIGHT: u32 = 10;

const LINE_ART_STEP: usize = 5;

fn random_point<S: Sampler>(n: f64, sampler: &mut S) -> Point {
    let x = sampler.uniform_float(0.0, n);
    let y = sampler.uniform_float(0.0, n);
    Point::new(x, y)
}

fn random_points<S: Sampler>(count: usize, n: f64, sampler: &mut S) -> Vec<Point> {
    (0..count).map(|_| random_point(n, sampler)).collect()
}

fn gradient<S: Sampler>(scene: &mut Scene, n: f64, sampler: &mut S) {
    let start = sampler.random_color();
    let end = sampler.random_color();
    let id = scene.define_gradient(GradientDefinition::diagonal("grad", start, end));
    scene.push(Primitive::Rectangle {
        x: 0.0,
        y: 0.0,
        width: n,
        height: n,
        style: Style::gradient(id),
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Circle,
    Rectangle,
    Polygon,
}

fn geometric<S: Sampler>(scene: &mut Scene, n: f64, sampler: &mut S) {
    const SHAPES: [Shape; 3] = [Shape::Circle, Shape::Rectangle, Shape::Polygon];

    for _ in 0..GEOMETRIC_SHAPES {
        let shape = sampler.choice(&SHAPES).copied().unwrap_or(Shape::Circle);
        let style = Style::filled(sampler.random_color());
        let primitive = match shape {
            Shape::Circle => {
                let center = random_point(n, sampler);
                let r = sampler.uniform_float(n * 0.1, n * 0.3);
                Primitive::Circle { cx: center.x, cy: center.y, r, style }
            }
            Shape::Rectangle => {
                let width = sampler.uniform_float(n * 0.2, n * 0.5);
                let height = sampler.uniform_float(n * 0.2, n * 0.5);
                // Origin drawn from the remaining slack keeps the rect on canvas.
                let x = sampler.uniform_float(0.0, n - width);
                let y = sampler.uniform_float(0.0, n - height);
                Primitive::Rectangle { x, y, width, height, style }
            }
            Shape::Polygon => {
                let count = sampler.uniform_int(3, 6) as usize;
                Primitive::Polygon { points: random_points(count, n, sampler), style }
            }
        };
        scene.push(primitive);
    }
}

fn line_art<S: Sampler>(scene: &mut Scene, size: u32, sampler: &mut S) {
    let n = f64::from(size);
    let points = (0..=size)
        .step_by(LINE_ART_STEP)
        .map(|x| {
            let x = f64::from(x);
            Point::new(x, n / 2.0 + (x / 20.0).sin() * n / 6.0)
        })
        .collect();
    scene.push(Primitive::Polyline {
        points,
        style: Style::stroked(sampler.random_color(), 2.0),
    });
}

fn watercolor<S: Sampler>(scene: &mut Scene, n: f64, sampler: &mut S) {
    for _ in 0..WATERCOLOR_LAYERS {
        let center = random_point(n, sampler);
        let r = sampler.uniform_float(n * 0.3, n * 0.6);
        let style = Style::translucent(sampler.random_color(), WATERCOLOR_OPACITY);
        scene.push(Primitive::Circle { cx: center.x, cy: center.y, r, style });
    }
}

fn pixel<S: Sampler>(scene: &mut Scene, n: f64, sampler: &mut S) {
    let cell = n / f64::from(PIXEL_GRID);
    for i in 0..PIXEL_GRID {
        for j in 0..PIXEL_GRID {
            if sampler.chance(0.5) {
                scene.push(Primitive::Rectangle {
                    x: f64::from(i) * cell,
                    y: f64::from(j) * cell,
                    width: cell,
                    height: cell,
                    style: Style::filled(sampler.random_color()),
                });
            }
        }
    }
}

fn ornament<S: Sampler>(scene: &mut Scene, size: u32, sampler: &mut S) {
    let offset = f64::from(ORNAMENT_SPACING / 2);
    for x in (0..size).step_by(ORNAMENT_SPACING as usize) {
        for y in (0..size).step_by(ORNAMENT_SPACING as usize) {
            if sampler.chance(0.7) {
                scene.push(Primitive::Circle {
                    cx: f64::from(x) + offset,
                    cy: f64::from(y) + offset,
                    r: ORNAMENT_RADIUS,
                    style: Style::filled(sampler.random_color()),
                });
            }
        }
    }
}

fn biomorphic<S: Sampler>(scene: &mut Scene, n: f64, sampler: &mut S) {
    let points = random_points(BIOMORPHIC_VERTICES, n, sampler);
    scene.push(Primitive::Polygon {
        points,
        style: Style::filled(sampler.random_color()),
    });
}

fn cosmic<S: Sampler>(scene: &mut Scene, n: f64, sampler: &mut S) {
    scene.push(Primitive::Background { paint: Paint::Color(Color::BLACK) });
    for _ in 0..COSMIC_STARS {
        let center = random_point(n, sampler);
        let r = sampler.uniform_float(1.0, 3.0);
        scene.push(Primitive::Circle {
            cx: center.x,
            cy: center.y,
            r,
            style: Style::filled(Color::WHITE),
        });
    }
}

fn doodle<S: Sampler>(scene: &mut Scene, n: f64, sampler: &mut S) {
    for _ in 0..DOODLE_STROKES {
        let points = random_points(DOODLE_VERTICES, n, sampler);
        scene.push(Primitive::Polyline {
            points,
            style: Style::stroked(sampler.random_color(), 1.0),
        });
    }
}

fn stripe<S: Sampler>(scene: &mut Scene, size: u32, sampler: &mut S) {
    for y in (0..size).step_by(STRIPE_PERIOD as usize) {
        // Clipped on canvases whose side is not a multiple of the period.
        let height = STRIPE_HEIGHT.min(size - y);
        scene.push(Primitive::Rectangle {
            x: 0.0,
            y: f64::from(y),
            width: f64::from(size),
            height: f64::from(height),
            style: Style::filled(sampler.random_color()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::RngSampler;
    use crate::scene::PrimitiveKind;

    #[test]
    fn test_line_art_follows_sine() {
        let mut s = RngSampler::seeded(0);
        let scene = Generator::LineArt.generate(256, &mut s);
        let Primitive::Polyline { points, style } = &scene.primitives[0] else {
            panic!("expected polyline");
        };
        assert_eq!(points.len(), 52);
        assert_eq!(points[0], Point::new(0.0, 128.0));
        let last = points.last().unwrap();
        assert_eq!(last.x, 255.0);
        assert!((last.y - (128.0 + (255.0f64 / 20.0).sin() * 256.0 / 6.0)).abs() < 1e-9);
        assert_eq!(style.fill, Paint::None);
    }

    #[test]
    fn test_ornament_grid_dots() {
        let mut s = RngSampler::seeded(5);
        let scene = Generator::Ornament.generate(256, &mut s);
        // 13 x 13 candidate centers
        assert!(scene.len() <= 169);
        for p in &scene.primitives {
            let Primitive::Circle { cx, cy, r, .. } = p else { panic!("expected circle") };
            assert_eq!(*r, ORNAMENT_RADIUS);
            assert_eq!((cx - 10.0) % 20.0, 0.0);
            assert_eq!((cy - 10.0) % 20.0, 0.0);
        }
    }

    #[test]
    fn test_stripe_clipped_on_small_canvas() {
        let mut s = RngSampler::seeded(5);
        let scene = Generator::Stripe.generate(25, &mut s);
        assert_eq!(scene.len(), 2);
        let Primitive::Rectangle { y, height, .. } = &scene.primitives[1] else {
            panic!("expected rect")
        };
        assert_eq!((*y, *height), (20.0, 5.0));
    }

    #[test]
    fn test_watercolor_layers_translucent() {
        let mut s = RngSampler::seeded(9);
        let scene = Generator::Watercolor.generate(100, &mut s);
        assert_eq!(scene.len(), WATERCOLOR_LAYERS);
        for p in &scene.primitives {
            let Primitive::Circle { r, style, .. } = p else { panic!("expected circle") };
            assert!((100.0 * 0.3..=100.0 * 0.6).contains(r));
            assert_eq!(style.fill_opacity, Some(WATERCOLOR_OPACITY));
        }
    }

    #[test]
    fn test_doodle_and_biomorphic_shapes() {
        let mut s = RngSampler::seeded(2);
        let doodle = Generator::Doodle.generate(64, &mut s);
        assert_eq!(doodle.len(), DOODLE_STROKES);
        for p in &doodle.primitives {
            let Primitive::Polyline { points, style } = p else { panic!("expected polyline") };
            assert_eq!(points.len(), DOODLE_VERTICES);
            assert_eq!(style.stroke_width, Some(1.0));
            assert_eq!(style.fill, Paint::None);
        }

        let bio = Generator::Biomorphic.generate(64, &mut s);
        assert_eq!(bio.len(), 1);
        assert_eq!(bio.primitives[0].kind(), PrimitiveKind::Polygon);
        assert!(bio.primitives[0].bounds(64.0).within(64.0));
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Generator::ALL.iter().map(|s| s.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Generator::ALL.len());
    }
}
