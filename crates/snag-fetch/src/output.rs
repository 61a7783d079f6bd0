use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::Path;

use crate::error::{Error, Result};

/// Open the output file, appending when a partial download is continued and
/// truncating otherwise.
pub(crate) fn open_output(path: &Path, append: bool) -> Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(|source| Error::Output {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(BufWriter::new(file))
}

/// Size of an existing partial output, 0 when there is none.
pub(crate) fn existing_len(path: &Path) -> u64 {
    fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .map_or(0, |m| m.len())
}
