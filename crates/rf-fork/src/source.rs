//! Random-access big-endian byte sources.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Path suffix that exposes a file's resource fork on macOS.
pub const NAMED_FORK_SUFFIX: &str = "..namedfork/rsrc";

/// An immutable, randomly addressable byte sequence of known length.
///
/// Implementors only supply [`len`](ByteSource::len) and
/// [`read_exact_at`](ByteSource::read_exact_at); the integer readers are
/// big-endian, matching every on-disk structure in a resource fork.
pub trait ByteSource {
    /// Total number of bytes.
    fn len(&self) -> u64;

    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// Fails with [`io::ErrorKind::UnexpectedEof`] if the range runs past
    /// the end of the source.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_u8(&self, offset: u64) -> io::Result<u8> {
        let mut b = [0u8; 1];
        self.read_exact_at(offset, &mut b)?;
        Ok(b[0])
    }

    fn read_u16_be(&self, offset: u64) -> io::Result<u16> {
        let mut b = [0u8; 2];
        self.read_exact_at(offset, &mut b)?;
        Ok(u16::from_be_bytes(b))
    }

    fn read_u32_be(&self, offset: u64) -> io::Result<u32> {
        let mut b = [0u8; 4];
        self.read_exact_at(offset, &mut b)?;
        Ok(u32::from_be_bytes(b))
    }

    /// Copy `len` bytes starting at `offset` into a new buffer.
    fn read_vec(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact_at(offset, &mut buf)?;
        Ok(buf)
    }

    /// A sub-range view whose offsets are relative to `start`.
    ///
    /// The window is clamped to the end of the source.
    fn window(&self, start: u64) -> Window<'_, Self>
    where
        Self: Sized,
    {
        let start = start.min(self.len());
        Window { source: self, start, len: self.len() - start }
    }
}

fn out_of_range(offset: u64, want: usize, len: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("read of {} bytes at {:#x} exceeds source length {:#x}", want, offset, len),
    )
}

impl ByteSource for [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let start = usize::try_from(offset).map_err(|_| out_of_range(offset, buf.len(), ByteSource::len(self)))?;
        let end = start
            .checked_add(buf.len())
            .filter(|&end| end <= <[u8]>::len(self))
            .ok_or_else(|| out_of_range(offset, buf.len(), ByteSource::len(self)))?;
        buf.copy_from_slice(&self[start..end]);
        Ok(())
    }
}

impl ByteSource for Vec<u8> {
    fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.as_slice().read_exact_at(offset, buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &S {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_exact_at(offset, buf)
    }
}

/// A view into part of another source, addressed from zero.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a, S> {
    source: &'a S,
    start: u64,
    len: u64,
}

impl<S> Window<'_, S> {
    /// Absolute offset of this window's first byte in the parent source.
    pub fn start(&self) -> u64 {
        self.start
    }
}

impl<S: ByteSource> ByteSource for Window<'_, S> {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        match offset.checked_add(buf.len() as u64) {
            Some(end) if end <= self.len => self.source.read_exact_at(self.start + offset, buf),
            _ => Err(out_of_range(offset, buf.len(), self.len)),
        }
    }
}

/// A file opened for positional reads.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
    path: PathBuf,
}

impl FileSource {
    /// Open `path` and read its primary (data) fork.
    ///
    /// This is also the fallback on systems without named forks, where the
    /// resource fork bytes have been copied into an ordinary file.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let len = file.metadata()?.len();
        tracing::debug!(path = %path.display(), len, "opened byte source");
        Ok(Self { file, len, path })
    }

    /// Open the resource fork of `path` through its named-fork path.
    pub fn open_resource_fork(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::open(path.as_ref().join(NAMED_FORK_SUFFIX))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        match offset.checked_add(buf.len() as u64) {
            Some(end) if end <= self.len => read_file_at(&self.file, offset, buf),
            _ => Err(out_of_range(offset, buf.len(), self.len)),
        }
    }
}

#[cfg(unix)]
fn read_file_at(file: &File, offset: u64, buf: &mut [u8]) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn read_file_at(file: &File, mut offset: u64, mut buf: &mut [u8]) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => {
                buf = &mut std::mem::take(&mut buf)[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
