//! Generation Pipeline - Selection, Rendering, Output
//!
//! Resolves a selection against the registry, generates and serializes each
//! scene, and hands documents to an [`OutputSink`]. Unknown generator names
//! fail the request; nothing is skipped silently.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::hashing::{compute_manifest_hash, sha256_hex};
use crate::registry::{GeneratorDescriptor, Registry, RegistryError};
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::svg::{self, SvgError};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Render error: {0}")]
    Render(#[from] SvgError),

    #[error("Canvas size must be positive")]
    InvalidCanvasSize,

    #[error("Malformed response for {name}: {reason}")]
    MalformedResponse { name: String, reason: String },

    #[error("Output key is not a plain file name: {0}")]
    InvalidKey(String),

    #[error("Failed to write {path}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Which generators a request covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// One of every registered generator, in registry order
    All,
    /// One instance of the named generator
    Single(String),
}

impl Selection {
    pub fn from_name(name: Option<String>) -> Self {
        match name {
            Some(n) => Selection::Single(n),
            None => Selection::All,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub index: usize,
    pub name: &'static str,
    /// Output identity: `avatar_<index>.svg` or `<name>_<id>.svg`
    pub key: String,
    pub document: String,
}

/// Payload of the cover endpoint: an id plus the document as a data URL.
/// A missing `imageUrl` reads as empty and fails on import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverResponse {
    pub id: String,
    #[serde(default)]
    pub image_url: String,
}

/// A saved exchange with the cover endpoint: the generator name that was
/// requested, and the response body exactly as it came back.
///
/// The body stays untyped until import so one bad item cannot fail the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub response: serde_json::Value,
}

impl CoverRecord {
    pub fn new(name: impl Into<String>, response: &CoverResponse) -> Self {
        Self {
            name: name.into(),
            response: serde_json::json!({
                "id": response.id,
                "imageUrl": response.image_url,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub index: usize,
    pub name: String,
    pub key: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchManifest {
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub canvas_size: u32,
    pub entries: Vec<ManifestEntry>,
    pub manifest_hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub saved: Vec<String>,
    pub skipped: Vec<SkippedCover>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedCover {
    pub name: String,
    pub reason: String,
}

/// Destination for finished documents. Each key is written once.
pub trait OutputSink {
    fn write(&mut self, key: &str, document: &[u8]) -> Result<(), PipelineError>;
}

/// Writes one file per key under a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Creates `dir` (and parents) if missing.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| PipelineError::FileSystem {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Uses `dir` as is; writes fail if it does not exist.
    pub fn existing(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for DirectorySink {
    fn write(&mut self, key: &str, document: &[u8]) -> Result<(), PipelineError> {
        check_key(key)?;
        let path = self.dir.join(key);
        fs::write(&path, document).map_err(|source| PipelineError::FileSystem {
            path: path.clone(),
            source,
        })?;
        log::info!("saved {}", path.display());
        Ok(())
    }
}

/// Keeps documents in memory, in write order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, key: &str, document: &[u8]) -> Result<(), PipelineError> {
        check_key(key)?;
        self.entries.push((key.to_string(), document.to_vec()));
        Ok(())
    }
}

/// Keys name a single entry directly inside the sink.
fn check_key(key: &str) -> Result<(), PipelineError> {
    let mut components = Path::new(key).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !key.contains(['/', '\\']) => Ok(()),
        _ => Err(PipelineError::InvalidKey(key.to_string())),
    }
}

/// Ids become part of a file name, so only `[A-Za-z0-9_-]` is accepted.
fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn batch_key(index: usize) -> String {
    format!("avatar_{}.svg", index)
}

pub fn single_key(name: &str, id: &str) -> String {
    format!("{}_{}.svg", name, id)
}

/// The generation pipeline - single entry point for producing images
pub struct GenerationPipeline {
    registry: Registry,
    canvas_size: u32,
}

impl GenerationPipeline {
    pub fn new(registry: Registry, canvas_size: u32) -> Result<Self, PipelineError> {
        if canvas_size == 0 {
            return Err(PipelineError::InvalidCanvasSize);
        }
        Ok(Self { registry, canvas_size })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    /// Generate one scene by wire name.
    pub fn generate<S: Sampler>(&self, name: &str, sampler: &mut S) -> Result<Scene, PipelineError> {
        let descriptor = self.registry.find(name)?;
        Ok(descriptor.generator.generate(self.canvas_size, sampler))
    }

    /// Generate one scene by registry position.
    pub fn generate_at<S: Sampler>(&self, index: usize, sampler: &mut S) -> Result<Scene, PipelineError> {
        let descriptor = self.registry.get(index)?;
        Ok(descriptor.generator.generate(self.canvas_size, sampler))
    }

    /// Descriptors covered by `selection`, in registry order.
    ///
    /// Nothing is generated; callers check names here before touching a sink.
    pub fn resolve(&self, selection: &Selection) -> Result<Vec<&GeneratorDescriptor>, PipelineError> {
        match selection {
            Selection::All => Ok(self.registry.list().iter().collect()),
            Selection::Single(name) => Ok(vec![self.registry.find(name)?]),
        }
    }

    /// Resolve the selection and render each document, in registry order.
    pub fn render<S: Sampler>(
        &self,
        selection: &Selection,
        sampler: &mut S,
    ) -> Result<Vec<RenderedImage>, PipelineError> {
        self.resolve(selection)?
            .into_iter()
            .map(|d| {
                let key = match selection {
                    Selection::All => batch_key(d.index),
                    Selection::Single(_) => single_key(d.name, &Uuid::new_v4().to_string()),
                };
                self.render_one(d, key, &mut *sampler)
            })
            .collect()
    }

    fn render_one<S: Sampler>(
        &self,
        descriptor: &GeneratorDescriptor,
        key: String,
        sampler: &mut S,
    ) -> Result<RenderedImage, PipelineError> {
        let scene = descriptor.generator.generate(self.canvas_size, sampler);
        log::debug!("{}: {} primitives", descriptor.name, scene.len());
        Ok(RenderedImage {
            index: descriptor.index,
            name: descriptor.name,
            key,
            document: svg::render(&scene)?,
        })
    }

    /// Render the selection and write every document to `sink`.
    ///
    /// Sink failures abort the batch and propagate.
    pub fn write_batch<S: Sampler, O: OutputSink>(
        &self,
        selection: &Selection,
        sampler: &mut S,
        sink: &mut O,
    ) -> Result<BatchManifest, PipelineError> {
        let images = self.render(selection, sampler)?;
        let mut entries = Vec::with_capacity(images.len());

        for image in images {
            sink.write(&image.key, image.document.as_bytes())?;
            entries.push(ManifestEntry {
                index: image.index,
                name: image.name.to_string(),
                key: image.key,
                sha256: sha256_hex(image.document.as_bytes()),
            });
        }

        let mut manifest = BatchManifest {
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            canvas_size: self.canvas_size,
            entries,
            manifest_hash: String::new(), // Computed after
        };
        manifest.manifest_hash = compute_manifest_hash(&manifest)?;

        Ok(manifest)
    }

    /// Write the selection into `dir`, creating it only once every name in
    /// the selection has resolved.
    pub fn write_batch_to_dir<S: Sampler>(
        &self,
        selection: &Selection,
        sampler: &mut S,
        dir: impl Into<PathBuf>,
    ) -> Result<BatchManifest, PipelineError> {
        self.resolve(selection)?;
        let mut sink = DirectorySink::create(dir)?;
        self.write_batch(selection, sampler, &mut sink)
    }

    /// Build the cover endpoint payload for one named generator.
    pub fn generate_cover<S: Sampler>(
        &self,
        name: &str,
        sampler: &mut S,
    ) -> Result<CoverResponse, PipelineError> {
        let scene = self.generate(name, sampler)?;
        let document = svg::render(&scene)?;
        Ok(CoverResponse {
            id: Uuid::new_v4().to_string(),
            image_url: svg::to_data_url(&document),
        })
    }

    /// Decode one saved cover exchange and store it as `<name>_<id>.svg`.
    ///
    /// The name must be registered; the stored key uses the registry's
    /// spelling. Bodies without a usable id or data URL are
    /// [`PipelineError::MalformedResponse`].
    pub fn import_cover<O: OutputSink>(
        &self,
        record: &CoverRecord,
        sink: &mut O,
    ) -> Result<String, PipelineError> {
        let descriptor = self.registry.find(&record.name)?;
        let malformed = |reason: String| PipelineError::MalformedResponse {
            name: descriptor.name.to_string(),
            reason,
        };

        let cover: CoverResponse =
            serde_json::from_value(record.response.clone()).map_err(|e| malformed(e.to_string()))?;
        if !is_safe_id(&cover.id) {
            return Err(malformed(format!("unusable id {:?}", cover.id)));
        }
        let document = svg::from_data_url(&cover.image_url).map_err(|e| malformed(e.to_string()))?;

        let key = single_key(descriptor.name, &cover.id);
        sink.write(&key, document.as_bytes())?;
        Ok(key)
    }

    /// Import every record. Unknown names and malformed bodies are reported
    /// and skipped; sink failures abort.
    pub fn import_covers<O: OutputSink>(
        &self,
        records: &[CoverRecord],
        sink: &mut O,
    ) -> Result<ImportReport, PipelineError> {
        let mut report = ImportReport::default();

        for record in records {
            match self.import_cover(record, sink) {
                Ok(key) => report.saved.push(key),
                Err(PipelineError::MalformedResponse { name, reason }) => {
                    log::warn!("[{}] unexpected payload: {}", name, reason);
                    report.skipped.push(SkippedCover { name, reason });
                }
                Err(PipelineError::Registry(e)) => {
                    log::warn!("[{}] {}", record.name, e);
                    report.skipped.push(SkippedCover {
                        name: record.name.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }
}

impl Default for GenerationPipeline {
    fn default() -> Self {
        Self {
            registry: Registry::default(),
            canvas_size: crate::config::DEFAULT_CANVAS_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::RngSampler;

    #[test]
    fn test_batch_keys_follow_registry_order() {
        let pipeline = GenerationPipeline::default();
        let mut sink = MemorySink::new();
        let manifest = pipeline
            .write_batch(&Selection::All, &mut RngSampler::seeded(1), &mut sink)
            .unwrap();
        let expected: Vec<String> = (0..10).map(batch_key).collect();
        assert_eq!(sink.keys(), expected.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(manifest.entries.len(), 10);
        assert_eq!(manifest.entries[3].name, "watercolor");
        assert!(!manifest.manifest_hash.is_empty());
    }

    #[test]
    fn test_single_key_uses_name_and_id() {
        let pipeline = GenerationPipeline::default();
        let images = pipeline
            .render(&Selection::Single("cosmic".into()), &mut RngSampler::seeded(1))
            .unwrap();
        assert_eq!(images.len(), 1);
        assert!(images[0].key.starts_with("cosmic_"));
        assert!(images[0].key.ends_with(".svg"));
        assert_eq!(images[0].index, 7);
    }

    #[test]
    fn test_zero_canvas_rejected() {
        assert!(matches!(
            GenerationPipeline::new(Registry::new(), 0),
            Err(PipelineError::InvalidCanvasSize)
        ));
    }

    #[test]
    fn test_resolve_checks_names_up_front() {
        let pipeline = GenerationPipeline::default();
        assert_eq!(pipeline.resolve(&Selection::All).unwrap().len(), 10);
        let single = pipeline.resolve(&Selection::Single("pixel".into())).unwrap();
        assert_eq!(single[0].index, 4);
        assert!(matches!(
            pipeline.resolve(&Selection::Single("Pixel".into())),
            Err(PipelineError::Registry(RegistryError::GeneratorNotFound(_)))
        ));
    }

    #[test]
    fn test_ids_limited_to_file_name_chars() {
        assert!(is_safe_id("V1StGXR8_Z5jdHi6B-myT"));
        assert!(is_safe_id(&Uuid::new_v4().to_string()));
        for id in ["", "..", "a/b", "a\\b", "x.svg", "a b"] {
            assert!(!is_safe_id(id), "{:?}", id);
        }
    }

    #[test]
    fn test_sinks_reject_nested_keys() {
        let mut sink = MemorySink::new();
        for key in ["../up.svg", "a/b.svg", "a\\b.svg", "..", "", "/abs.svg"] {
            assert!(
                matches!(sink.write(key, b"x"), Err(PipelineError::InvalidKey(_))),
                "{:?}",
                key
            );
        }
        assert!(sink.is_empty());
        sink.write("avatar_0.svg", b"x").unwrap();
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_cover_record_wraps_endpoint_body() {
        let pipeline = GenerationPipeline::default();
        let cover = pipeline.generate_cover("doodle", &mut RngSampler::seeded(2)).unwrap();
        let record = CoverRecord::new("doodle", &cover);
        assert_eq!(record.response["id"], cover.id.as_str());
        assert!(record.response.get("name").is_none());

        let mut sink = MemorySink::new();
        let key = pipeline.import_cover(&record, &mut sink).unwrap();
        assert_eq!(key, format!("doodle_{}.svg", cover.id));
    }

    #[test]
    fn test_manifest_hash_matches_document() {
        let pipeline = GenerationPipeline::default();
        let mut sink = MemorySink::new();
        let manifest = pipeline
            .write_batch(&Selection::Single("stripe".into()), &mut RngSampler::seeded(4), &mut sink)
            .unwrap();
        let entry = &manifest.entries[0];
        assert_eq!(entry.sha256, sha256_hex(sink.get(&entry.key).unwrap()));
    }
}
