use crate::icon::render::RenderOptions;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// One source image exported at one width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub source: PathBuf,
    pub width: u32,
    pub base_name: String,
    pub options: RenderOptions,
}

impl ExportJob {
    /// The file name of the produced icon, `<base><width>x<width>.png`.
    pub fn file_name(&self) -> String {
        format!("{}{}x{}.png", self.base_name, self.width, self.width)
    }

    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.file_name())
    }
}

impl Display for ExportJob {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source.display(), self.file_name())
    }
}

/// A source image together with the prefix of its outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub path: PathBuf,
    pub base_name: String,
}

/// The jobs of one target, all written into the same directory.
#[derive(Debug, Clone)]
pub struct ExportPlan {
    pub name: String,
    pub output_dir: PathBuf,
    pub jobs: Vec<ExportJob>,
}

impl ExportPlan {
    /// Expands every source at every width, sources first.
    pub fn expand(
        name: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        sources: &[SourceImage],
        widths: &[u32],
        options: RenderOptions,
    ) -> Self {
        let jobs = sources
            .iter()
            .flat_map(|source| {
                widths.iter().map(move |&width| ExportJob {
                    source: source.path.clone(),
                    width,
                    base_name: source.base_name.clone(),
                    options,
                })
            })
            .collect();

        Self {
            name: name.into(),
            output_dir: output_dir.into(),
            jobs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_outputs_after_base_and_width() {
        let plan = ExportPlan::expand(
            "desktop-icon",
            "resized_icons",
            &[SourceImage {
                path: "dino_cpu.png".into(),
                base_name: "icon".to_owned(),
            }],
            &[128, 64, 16],
            RenderOptions::default(),
        );

        let paths = plan
            .jobs
            .iter()
            .map(|job| job.output_path(&plan.output_dir))
            .collect::<Vec<_>>();

        assert_eq!(
            paths,
            [
                Path::new("resized_icons/icon128x128.png"),
                Path::new("resized_icons/icon64x64.png"),
                Path::new("resized_icons/icon16x16.png"),
            ]
        );
    }

    #[test]
    fn expands_sources_before_widths() {
        let sources = ["back", "top"].map(|name| SourceImage {
            path: PathBuf::from(format!("{name}.png")),
            base_name: format!("view_direction_{name}"),
        });

        let plan = ExportPlan::expand("views", ".", &sources, &[32, 16], RenderOptions::default());

        let names = plan.jobs.iter().map(ExportJob::file_name).collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "view_direction_back32x32.png",
                "view_direction_back16x16.png",
                "view_direction_top32x32.png",
                "view_direction_top16x16.png",
            ]
        );
    }
}
