use std::error::Error;
use std::fs::File;
use std::path::Path;

/// Create the output file, creating parent directories as needed.
pub(crate) fn create_output_file<P: AsRef<Path>>(path: P) -> Result<File, Box<dyn Error>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(File::create(path)?)
}
