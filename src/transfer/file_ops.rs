//! Module `file_ops`
//!
//! Streams file contents out of the root (download) and into it (upload).
//! Uploads check the target before choosing how to open it, so a directory
//! is never replaced and an append never creates a file.

use log::{debug, info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};

use crate::error::DriverError;
use crate::storage::validation::RootContext;
use crate::transfer::modes::{ReplacePolicy, WriteMode};

pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Settings shared by every upload on a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    pub buffer_size: usize,
    pub replace_policy: ReplacePolicy,
    pub sync_on_close: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            replace_policy: ReplacePolicy::default(),
            sync_on_close: false,
        }
    }
}

/// Opens `path` for reading positioned at `offset`.
///
/// Returns the full size of the file, independent of `offset`, along with
/// the open handle. Dropping the handle closes it.
pub fn get_file(root: &RootContext, path: &str, offset: u64) -> Result<(u64, File), DriverError> {
    let real_path = root.resolve(path)?;
    let virtual_path = root.virtual_path(&real_path);
    root.ensure_followed_within(&real_path)?;

    let mut file =
        File::open(&real_path).map_err(|e| DriverError::from_io("open", virtual_path.clone(), e))?;

    let meta = file
        .metadata()
        .map_err(|e| DriverError::io("stat", virtual_path.clone(), e))?;
    if meta.is_dir() {
        return Err(DriverError::NotAFile(virtual_path));
    }

    file.seek(SeekFrom::Start(offset))
        .map_err(|e| DriverError::io("seek", virtual_path.clone(), e))?;

    info!(
        "Opened {} for download at offset {} ({} bytes, real: {})",
        virtual_path,
        offset,
        meta.len(),
        real_path.display()
    );

    Ok((meta.len(), file))
}

/// Writes everything from `data` into `path`.
///
/// Returns the number of bytes copied by this call. Bytes already written
/// when a copy fails are left in place.
pub fn put_file<R: Read + ?Sized>(
    root: &RootContext,
    path: &str,
    data: &mut R,
    mode: WriteMode,
    options: &TransferOptions,
) -> Result<u64, DriverError> {
    let real_path = root.resolve(path)?;
    let virtual_path = root.virtual_path(&real_path);

    let existing = match fs::symlink_metadata(&real_path) {
        Ok(meta) => Some(meta),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(DriverError::io("put", virtual_path, e)),
    };

    if existing.as_ref().is_some_and(|meta| meta.is_dir()) {
        return Err(DriverError::DirectoryCollision(virtual_path));
    }

    let mut file = match mode {
        WriteMode::Replace => {
            // A link is replaced rather than written through
            let remove_first = match (&existing, options.replace_policy) {
                (None, _) => false,
                (Some(_), ReplacePolicy::RemoveThenCreate) => true,
                (Some(meta), ReplacePolicy::Truncate) => meta.file_type().is_symlink(),
            };
            if remove_first {
                fs::remove_file(&real_path)
                    .map_err(|e| DriverError::io("remove", virtual_path.clone(), e))?;
                debug!("Removed existing {} before upload", virtual_path);
            }
            File::create(&real_path)
                .map_err(|e| DriverError::io("create", virtual_path.clone(), e))?
        }
        WriteMode::Append => {
            if existing.is_none() {
                return Err(DriverError::AppendTargetMissing(virtual_path));
            }
            root.ensure_followed_within(&real_path)?;
            let mut file = OpenOptions::new()
                .read(true)
                .append(true)
                .open(&real_path)
                .map_err(|e| DriverError::from_io("open", virtual_path.clone(), e))?;
            let start = file
                .seek(SeekFrom::End(0))
                .map_err(|e| DriverError::io("seek", virtual_path.clone(), e))?;
            debug!("Appending to {} from byte {}", virtual_path, start);
            file
        }
    };

    let written = copy_stream(data, &mut file, options.buffer_size)
        .map_err(|e| DriverError::io("write", virtual_path.clone(), e))?;

    if options.sync_on_close {
        file.sync_all()
            .map_err(|e| DriverError::io("sync", virtual_path.clone(), e))?;
    }

    info!(
        "Upload to {} completed ({:?}, {} bytes, real: {})",
        virtual_path,
        mode,
        written,
        real_path.display()
    );

    Ok(written)
}

/// Copies `reader` into `writer` with a fixed size buffer, then flushes.
fn copy_stream<R: Read + ?Sized, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer_size: usize,
) -> io::Result<u64> {
    let mut buffer = vec![0; buffer_size.max(1)];
    let mut total_bytes = 0u64;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {
                warn!("Interrupted read during upload, retrying");
                continue;
            }
            Err(e) => return Err(e),
        };

        writer.write_all(&buffer[..n])?;
        total_bytes += n as u64;
    }

    writer.flush()?;
    Ok(total_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that fails after yielding its data once
    struct FailingReader {
        data: Option<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.take() {
                Some(data) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                None => Err(io::Error::new(ErrorKind::ConnectionReset, "client went away")),
            }
        }
    }

    fn setup() -> (tempfile::TempDir, RootContext) {
        let dir = tempfile::tempdir().unwrap();
        let root = RootContext::new(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn copy_stream_uses_small_buffers() {
        let mut out = Vec::new();
        let n = copy_stream(&mut Cursor::new(b"abcdefghij".to_vec()), &mut out, 3).unwrap();
        assert_eq!(n, 10);
        assert_eq!(out, b"abcdefghij");
    }

    #[test]
    fn get_file_on_directory_is_wrong_type() {
        let (dir, root) = setup();
        fs::create_dir(dir.path().join("d")).unwrap();
        assert!(matches!(
            get_file(&root, "d", 0),
            Err(DriverError::NotAFile(_))
        ));
    }

    #[test]
    fn get_file_missing_is_not_found() {
        let (_dir, root) = setup();
        assert!(matches!(
            get_file(&root, "nope", 0),
            Err(DriverError::NotFound(_))
        ));
    }

    #[test]
    fn get_file_past_end_yields_nothing() {
        let (dir, root) = setup();
        fs::write(dir.path().join("f"), b"abc").unwrap();

        let (size, mut file) = get_file(&root, "f", 10).unwrap();
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).unwrap();
        assert_eq!(size, 3);
        assert!(buf.is_empty());
    }

    #[test]
    fn failed_copy_reports_error_and_keeps_partial_bytes() {
        let (dir, root) = setup();
        let mut data = FailingReader {
            data: Some(b"part".to_vec()),
        };

        let err = put_file(
            &root,
            "f",
            &mut data,
            WriteMode::Replace,
            &TransferOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DriverError::Io { op: "write", .. }));
        assert_eq!(fs::read(dir.path().join("f")).unwrap(), b"part");
    }

    #[cfg(unix)]
    #[test]
    fn truncate_policy_keeps_inode() {
        use std::os::unix::fs::MetadataExt;

        let (dir, root) = setup();
        let path = dir.path().join("f");
        fs::write(&path, b"old contents").unwrap();
        let inode = fs::metadata(&path).unwrap().ino();
        let options = TransferOptions {
            replace_policy: ReplacePolicy::Truncate,
            ..TransferOptions::default()
        };

        let n = put_file(
            &root,
            "f",
            &mut Cursor::new(b"new".to_vec()),
            WriteMode::Replace,
            &options,
        )
        .unwrap();
        assert_eq!(n, 3);
        assert_eq!(fs::read(&path).unwrap(), b"new");
        assert_eq!(fs::metadata(&path).unwrap().ino(), inode);
    }

    #[cfg(unix)]
    #[test]
    fn truncate_policy_replaces_symlinks_instead_of_writing_through() {
        let (dir, root) = setup();
        fs::write(dir.path().join("target"), b"keep").unwrap();
        std::os::unix::fs::symlink(dir.path().join("target"), dir.path().join("link")).unwrap();
        let options = TransferOptions {
            replace_policy: ReplacePolicy::Truncate,
            ..TransferOptions::default()
        };

        put_file(
            &root,
            "link",
            &mut Cursor::new(b"fresh".to_vec()),
            WriteMode::Replace,
            &options,
        )
        .unwrap();

        assert_eq!(fs::read(dir.path().join("target")).unwrap(), b"keep");
        let link_meta = fs::symlink_metadata(dir.path().join("link")).unwrap();
        assert!(link_meta.is_file());
        assert_eq!(fs::read(dir.path().join("link")).unwrap(), b"fresh");
    }

    #[cfg(unix)]
    #[test]
    fn links_to_files_outside_root_cannot_be_read_or_appended() {
        let outside = tempfile::tempdir().unwrap();
        let secret = outside.path().join("secret.txt");
        fs::write(&secret, b"SECRET").unwrap();
        let (dir, root) = setup();
        std::os::unix::fs::symlink(&secret, dir.path().join("link")).unwrap();

        assert!(matches!(
            get_file(&root, "link", 0),
            Err(DriverError::PathTraversal(_))
        ));

        let err = put_file(
            &root,
            "link",
            &mut Cursor::new(b"+PWN".to_vec()),
            WriteMode::Append,
            &TransferOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DriverError::PathTraversal(_)));
        assert_eq!(fs::read(&secret).unwrap(), b"SECRET");
    }

    #[cfg(unix)]
    #[test]
    fn links_within_root_are_followed() {
        let (dir, root) = setup();
        fs::write(dir.path().join("target"), b"abc").unwrap();
        std::os::unix::fs::symlink(dir.path().join("target"), dir.path().join("link")).unwrap();

        let (size, _) = get_file(&root, "link", 0).unwrap();
        assert_eq!(size, 3);

        put_file(
            &root,
            "link",
            &mut Cursor::new(b"def".to_vec()),
            WriteMode::Append,
            &TransferOptions::default(),
        )
        .unwrap();
        assert_eq!(fs::read(dir.path().join("target")).unwrap(), b"abcdef");
    }

    #[test]
    fn sync_on_close_still_writes() {
        let (dir, root) = setup();
        let options = TransferOptions {
            sync_on_close: true,
            ..TransferOptions::default()
        };
        put_file(
            &root,
            "f",
            &mut Cursor::new(b"durable".to_vec()),
            WriteMode::Replace,
            &options,
        )
        .unwrap();
        assert_eq!(fs::read(dir.path().join("f")).unwrap(), b"durable");
    }
}
