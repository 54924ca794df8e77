//! Atomic workbook persistence.
//!
//! Every mutation rewrites a whole workbook. The bytes go to a temp file in the destination
//! directory, are flushed and synced, and the temp file is then renamed over the destination. A
//! reader never sees a partially written workbook.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::{Result, StoreError};

fn parent_dir_or_dot(path: &Path) -> &Path {
    // `Path::parent` returns `Some("")` for bare file names like `Weir.xlsx`.
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

pub(crate) fn write_file_atomic(dest: &Path, bytes: &[u8]) -> Result<()> {
    let io_err = |source| StoreError::Io {
        path: dest.to_path_buf(),
        source,
    };

    let dir = parent_dir_or_dot(dest);
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.as_file_mut().write_all(bytes).map_err(io_err)?;
    tmp.as_file_mut().flush().map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;

    // The temp path removes the file on drop if the rename below fails.
    let tmp_path = tmp.into_temp_path();
    replace_file(tmp_path.as_ref(), dest).map_err(io_err)?;
    // Best effort: the file is already in place.
    let _ = sync_parent_dir(dest);
    Ok(())
}

fn sync_parent_dir(path: &Path) -> io::Result<()> {
    File::open(parent_dir_or_dot(path))?.sync_all()
}

/// Rename `from` over `to`, replacing an existing destination in one step.
fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt as _;
        use windows_sys::Win32::Storage::FileSystem::{MoveFileExW, MOVEFILE_REPLACE_EXISTING};

        fn to_wide_null(path: &Path) -> Vec<u16> {
            let mut wide: Vec<u16> = path.as_os_str().encode_wide().collect();
            wide.push(0);
            wide
        }

        let from_w = to_wide_null(from);
        let to_w = to_wide_null(to);
        let ok = unsafe { MoveFileExW(from_w.as_ptr(), to_w.as_ptr(), MOVEFILE_REPLACE_EXISTING) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}
