use crate::error::EncodeFailure;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct OutputGenerator {
    output_dir: PathBuf,
}

impl OutputGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Returns the final path of the given output file
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Creates the output directory, succeeding if it already exists
    pub fn create_output_dir(&self) -> Result<&Path, std::io::Error> {
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(&self.output_dir)
    }

    /// Writes an output file through a temporary sibling which replaces the
    /// final path only once `write` succeeded.
    pub fn write_output<F>(&self, file_name: &str, write: F) -> Result<PathBuf, EncodeFailure>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<(), EncodeFailure>,
    {
        self.create_output_dir()?;

        let final_path = self.output_path(file_name);
        let temp_path = self
            .output_dir
            .join(format!(".{}.{}.part", file_name, std::process::id()));

        let result = Self::write_temp(&temp_path, write)
            .and_then(|()| std::fs::rename(&temp_path, &final_path).map_err(EncodeFailure::from));

        match result {
            Ok(()) => Ok(final_path),
            Err(err) => {
                if let Err(remove_err) = std::fs::remove_file(&temp_path) {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            "Failed to remove temporary file {}: {}",
                            temp_path.display(),
                            remove_err
                        );
                    }
                }
                Err(err)
            }
        }
    }

    fn write_temp<F>(temp_path: &Path, write: F) -> Result<(), EncodeFailure>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<(), EncodeFailure>,
    {
        let mut writer = BufWriter::new(File::create(temp_path)?);
        write(&mut writer)?;
        writer.flush()?;

        let file = writer.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()?;

        Ok(())
    }
}
