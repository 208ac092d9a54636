use std::io;
use std::path::Path;

use quackdoc_core::{DocFormat, FileDescriptor};

use crate::persist::{FileInfoProvider, LocalFs};
use crate::ConvertError;

/// Read-only inspection of conversion inputs.
pub struct FileProbe<'a> {
    files: &'a dyn FileInfoProvider,
}

impl<'a> FileProbe<'a> {
    pub fn new(files: &'a dyn FileInfoProvider) -> Self {
        Self { files }
    }

    /// Snapshot `path`. The format comes from `format_hint`, else from the extension.
    pub fn probe(
        &self,
        path: &Path,
        format_hint: Option<&DocFormat>,
    ) -> Result<FileDescriptor, ConvertError> {
        let stat = self.files.stat(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ConvertError::InputNotFound(path.to_path_buf()),
            _ => ConvertError::InputUnreadable {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        })?;
        if !stat.is_file {
            return Err(ConvertError::InputUnreadable {
                path: path.to_path_buf(),
                message: "not a regular file".to_string(),
            });
        }

        let format = format_hint
            .cloned()
            .unwrap_or_else(|| DocFormat::from_path(path));
        Ok(FileDescriptor {
            path: path.to_path_buf(),
            format,
            size_bytes: stat.size,
            modified: stat.modified,
            extra_args: Vec::new(),
        })
    }
}

/// Probe a path on the local filesystem.
pub fn probe(path: &Path, format_hint: Option<&DocFormat>) -> Result<FileDescriptor, ConvertError> {
    FileProbe::new(&LocalFs).probe(path, format_hint)
}
