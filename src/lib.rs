//! AvatarForge Core - Procedural Placeholder Images
//!
//! # Ground Rules
//! 1. Generators Are Pure (size + sampler in, scene out)
//! 2. Randomness Is Injected, Never Global
//! 3. Scene Order Is Stacking Order
//! 4. The Registry Is Closed and Read-Only
//! 5. Unknown Names Fail, Never Fall Back

pub mod sampler;
pub mod scene;
pub mod generators;
pub mod registry;
pub mod svg;
pub mod hashing;
pub mod pipeline;
pub mod config;
pub mod tree;
pub mod logging;

pub use sampler::{Sampler, RngSampler};
pub use scene::{Color, Paint, Point, Primitive, PrimitiveKind, Scene, Style, GradientDefinition, GradientStop};
pub use generators::Generator;
pub use registry::{Registry, GeneratorDescriptor, RegistryError};
pub use svg::SvgError;
pub use hashing::{compute_manifest_hash, canonical_json, sha256_hex};
pub use pipeline::{GenerationPipeline, Selection, CoverResponse, CoverRecord, BatchManifest, OutputSink, DirectorySink, MemorySink, PipelineError};
pub use config::{GeneratorConfig, ConfigError, DEFAULT_CANVAS_SIZE};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
