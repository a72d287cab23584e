pub mod batch;
mod gen;
pub mod job;
pub mod meta;
pub mod render;
mod targets;

use crate::error::{ConfigError, ExportError};
use crate::icon::gen::OutputGenerator;
use crate::icon::job::{ExportJob, ExportPlan, SourceImage};
use crate::icon::meta::{ExportTarget, IconMetadata};
use crate::icon::render::{RenderOptions, TrimOutcome};
use image::{ImageReader, RgbaImage};
use std::path::{Path, PathBuf};

pub struct IconExporter {
    metadata: IconMetadata,
    resource_dir: PathBuf,
}

impl IconExporter {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        // Relative paths in the metadata are resolved against its directory
        let path = path.as_ref();
        let resource_dir = path.parent().ok_or(ConfigError::NoParentDir)?;

        let metadata = std::fs::read_to_string(path)?;
        let metadata = serde_json::from_str::<IconMetadata>(&metadata)
            .map_err(ConfigError::MetadataParse)?;

        Ok(Self::new(metadata, resource_dir))
    }

    pub fn new(metadata: IconMetadata, resource_dir: impl Into<PathBuf>) -> Self {
        Self {
            metadata,
            resource_dir: resource_dir.into(),
        }
    }

    /// Names of all targets, in metadata order.
    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.metadata.targets.iter().map(|t| t.name.as_str())
    }

    /// Expands the named target into its jobs.
    pub fn plan(&self, target: &str) -> Result<ExportPlan, ConfigError> {
        let target = self
            .metadata
            .targets
            .iter()
            .find(|t| t.name == target)
            .ok_or_else(|| ConfigError::TargetNotFound(target.to_string()))?;

        self.plan_target(target)
    }

    fn plan_target(&self, target: &ExportTarget) -> Result<ExportPlan, ConfigError> {
        let widths = target.widths.resolve()?;
        let sources = target
            .sources
            .iter()
            .map(|s| SourceImage {
                path: self.resource_dir.join(&s.file),
                base_name: s.base_name.clone(),
            })
            .collect::<Vec<_>>();

        let options = RenderOptions {
            filter: target.filter,
            margin: target.margin,
        };

        Ok(ExportPlan::expand(
            target.name.clone(),
            self.resource_dir.join(&target.output_dir),
            &sources,
            &widths,
            options,
        ))
    }
}

/// What a finished job produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub trim: TrimOutcome,
}

/// Loads, renders and writes a single icon.
///
/// The decoded source and the rendered icon live only for the duration of
/// this call.
pub fn export_job(
    job: &ExportJob,
    outputs: &OutputGenerator,
) -> Result<ExportOutcome, ExportError> {
    tracing::debug!("Exporting {}", job);

    let source = load_source(&job.source).map_err(|source| ExportError::Load {
        path: job.source.clone(),
        source,
    })?;

    let rendered = render::render_icon(&source, job.width, &job.options)?;
    drop(source);

    if rendered.trim == TrimOutcome::Skipped && job.options.margin > 0 {
        tracing::info!(
            "{}: {}px leaves no interior for a {}px border, trim skipped",
            job,
            job.width,
            job.options.margin
        );
    }

    let file_name = job.file_name();
    let path = outputs
        .write_output(&file_name, |writer| {
            targets::encode_png(&rendered.image, writer)?;
            Ok(())
        })
        .map_err(|source| ExportError::Encode {
            path: outputs.output_path(&file_name),
            source,
        })?;

    Ok(ExportOutcome {
        path,
        trim: rendered.trim,
    })
}

/// Decodes a source image, detecting the format from its contents rather
/// than trusting the file extension.
fn load_source(path: &Path) -> image::ImageResult<RgbaImage> {
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(image.into_rgba8())
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{Rgba, RgbaImage};
    use std::path::{Path, PathBuf};

    /// Writes an opaque square source image and returns its path.
    pub fn write_source(dir: &Path, name: &str, side: u32) -> PathBuf {
        let image = RgbaImage::from_fn(side, side, |x, y| {
            Rgba([(x * 255 / side) as u8, (y * 255 / side) as u8, 128, 255])
        });

        let path = dir.join(name);
        image.save(&path).unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::write_source;
    use super::*;
    use crate::icon::meta::DEFAULT_MARGIN;

    fn job(source: PathBuf, width: u32) -> ExportJob {
        ExportJob {
            source,
            width,
            base_name: "icon".to_owned(),
            options: RenderOptions::default(),
        }
    }

    #[test]
    fn exports_trimmed_square_png() {
        let scratch = tempfile::tempdir().unwrap();
        let source = write_source(scratch.path(), "dino_cpu.png", 200);
        let outputs = OutputGenerator::new(scratch.path().join("resized_icons"));

        let outcome = export_job(&job(source, 48), &outputs).unwrap();
        assert_eq!(outcome.trim, TrimOutcome::Applied);
        assert!(outcome.path.ends_with("resized_icons/icon48x48.png"));

        let icon = image::open(&outcome.path).unwrap();
        assert_eq!(icon.color(), image::ColorType::Rgba8);

        let icon = icon.into_rgba8();
        assert_eq!(icon.dimensions(), (48, 48));
        for (x, y, pixel) in icon.enumerate_pixels() {
            let border = x == 0 || y == 0 || x == 47 || y == 47;
            assert_eq!(pixel[3] == 0, border, "pixel {x},{y}");
        }
    }

    #[test]
    fn two_pixel_icon_is_exported_untrimmed() {
        let scratch = tempfile::tempdir().unwrap();
        let source = write_source(scratch.path(), "source.png", 64);
        let outputs = OutputGenerator::new(scratch.path());

        let outcome = export_job(&job(source, 2), &outputs).unwrap();
        assert_eq!(outcome.trim, TrimOutcome::Skipped);

        let icon = image::open(&outcome.path).unwrap().into_rgba8();
        assert_eq!(icon.dimensions(), (2, 2));
        assert!(icon.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn missing_source_is_a_load_error() {
        let scratch = tempfile::tempdir().unwrap();
        let outputs = OutputGenerator::new(scratch.path().join("out"));

        let result = export_job(&job(scratch.path().join("nope.png"), 16), &outputs);
        assert!(matches!(result, Err(ExportError::Load { .. })));
        assert!(!scratch.path().join("out").join("icon16x16.png").exists());
    }

    #[test]
    fn source_format_is_detected_from_contents() {
        let scratch = tempfile::tempdir().unwrap();
        let png = write_source(scratch.path(), "source.png", 40);
        let outputs = OutputGenerator::new(scratch.path().join("out"));

        for name in ["a.source", "no_extension"] {
            let renamed = scratch.path().join(name);
            std::fs::copy(&png, &renamed).unwrap();

            let outcome = export_job(&job(renamed, 16), &outputs).unwrap();
            let icon = image::open(&outcome.path).unwrap();
            assert_eq!((icon.width(), icon.height()), (16, 16));
        }
    }

    #[test]
    fn undecodable_source_is_a_load_error() {
        let scratch = tempfile::tempdir().unwrap();
        let source = scratch.path().join("broken.png");
        std::fs::write(&source, b"definitely not a png").unwrap();

        let result = export_job(&job(source, 16), &OutputGenerator::new(scratch.path()));
        assert!(matches!(result, Err(ExportError::Load { .. })));
    }

    #[test]
    fn plans_targets_relative_to_metadata_file() {
        let scratch = tempfile::tempdir().unwrap();
        let metadata_path = scratch.path().join("icon-export.json");
        std::fs::write(
            &metadata_path,
            r#"{
                "targets": [{
                    "name": "snapshot-icon",
                    "outputDir": "snapshot",
                    "widths": "toolbar",
                    "sources": [{ "file": "Snapshot Icon 1024x1024.png", "baseName": "snapshot_icon_" }]
                }]
            }"#,
        )
        .unwrap();

        let exporter = IconExporter::from_file(&metadata_path).unwrap();
        assert_eq!(exporter.target_names().collect::<Vec<_>>(), ["snapshot-icon"]);

        let plan = exporter.plan("snapshot-icon").unwrap();
        assert_eq!(plan.output_dir, scratch.path().join("snapshot"));
        assert_eq!(plan.jobs.len(), 5);
        assert_eq!(
            plan.jobs[0].source,
            scratch.path().join("Snapshot Icon 1024x1024.png")
        );
        assert_eq!(plan.jobs[0].file_name(), "snapshot_icon_128x128.png");
        assert_eq!(plan.jobs[0].options.margin, DEFAULT_MARGIN);

        assert!(matches!(
            exporter.plan("desktop-icon"),
            Err(ConfigError::TargetNotFound(name)) if name == "desktop-icon"
        ));
    }

    #[test]
    fn bundled_metadata_covers_every_icon_family() {
        let metadata: IconMetadata =
            serde_json::from_str(include_str!("../../assets/icon-export.json")).unwrap();
        let exporter = IconExporter::new(metadata, "images");

        let job_counts = exporter
            .target_names()
            .map(|t| exporter.plan(t).unwrap().jobs.len())
            .collect::<Vec<_>>();
        assert_eq!(job_counts, [12, 5, 30]);

        let desktop = exporter.plan("desktop-icon").unwrap();
        assert_eq!(
            desktop.jobs[0].output_path(&desktop.output_dir),
            Path::new("images/Desktop Icon/resized_icons/icon1024x1024.png")
        );
    }
}
