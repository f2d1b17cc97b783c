//! File input and geometry export.
//!
//! - [`InputFile`] - Stream bytes loaded from disk, memory-mapped when possible
//! - [`ply`] - Binary PLY writer
//! - [`obj`] - Wavefront OBJ writer

pub mod obj;
pub mod ply;

use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;

use crate::util::{Error, Result};

/// Bytes of an input file.
pub enum InputFile {
    /// Memory-mapped file
    #[cfg(feature = "mmap")]
    Mmap(memmap2::Mmap),
    /// File read into memory
    Bytes(Vec<u8>),
}

impl InputFile {
    /// Open a file, memory-mapping it when the `mmap` feature is enabled.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, cfg!(feature = "mmap"))
    }

    /// Open a file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        let size = file.metadata()?.len();

        #[cfg(feature = "mmap")]
        if use_mmap && size > 0 {
            // Safety: the map is read-only and dropped with the InputFile.
            let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            tracing::debug!(path = %path.display(), size, "mapped input file");
            return Ok(Self::Mmap(mmap));
        }
        #[cfg(not(feature = "mmap"))]
        let _ = use_mmap;

        let mut data = Vec::with_capacity(size as usize);
        file.read_to_end(&mut data)?;
        tracing::debug!(path = %path.display(), size, "read input file");
        Ok(Self::Bytes(data))
    }
}

impl Deref for InputFile {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            #[cfg(feature = "mmap")]
            Self::Mmap(mmap) => &mmap[..],
            Self::Bytes(data) => data.as_slice(),
        }
    }
}

impl std::fmt::Debug for InputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self {
            #[cfg(feature = "mmap")]
            Self::Mmap(_) => "mmap",
            Self::Bytes(_) => "bytes",
        };
        f.debug_struct("InputFile").field("mode", &mode).field("len", &self.len()).finish()
    }
}
