use std::fs::{self, File};
use std::io::{self, Read};
use std::ops::Deref;
use std::path::Path;

#[cfg(target_os = "linux")]
use std::sync::atomic::{AtomicBool, Ordering};

use memmap2::{Mmap, MmapOptions};

/// Input bytes of one file: a read-only mapping or an owned buffer.
/// Dereferences to `&[u8]`.
pub enum FileData {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Deref for FileData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileData::Mmap(m) => m,
            FileData::Owned(v) => v,
        }
    }
}

/// Files below this size are read into memory; larger ones are mapped.
pub const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Cleared after the first EPERM from O_NOATIME.
#[cfg(target_os = "linux")]
static NOATIME_SUPPORTED: AtomicBool = AtomicBool::new(true);

/// Opens `path` for reading, with O_NOATIME on Linux when the caller owns
/// the file.
#[cfg(target_os = "linux")]
pub fn open_noatime(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    if NOATIME_SUPPORTED.load(Ordering::Relaxed) {
        match fs::OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NOATIME)
            .open(path)
        {
            Ok(f) => return Ok(f),
            Err(ref e) if e.raw_os_error() == Some(libc::EPERM) => {
                NOATIME_SUPPORTED.store(false, Ordering::Relaxed);
            }
            Err(e) => return Err(e),
        }
    }
    File::open(path)
}

#[cfg(not(target_os = "linux"))]
pub fn open_noatime(path: &Path) -> io::Result<File> {
    File::open(path)
}

/// Reads a whole input file. Regular files of at least [`MMAP_THRESHOLD`]
/// bytes are mapped; everything else is read.
pub fn read_file(path: &Path) -> io::Result<FileData> {
    let file = open_noatime(path)?;
    let metadata = file.metadata()?;
    let len = metadata.len();

    if len == 0 || !metadata.file_type().is_file() {
        // Empty regular files, FIFOs and devices: size unknown up front.
        let mut buf = Vec::new();
        let mut reader = file;
        reader.read_to_end(&mut buf)?;
        return Ok(FileData::Owned(buf));
    }

    if len < MMAP_THRESHOLD {
        let mut buf = vec![0u8; len as usize];
        let n = read_full(&mut &file, &mut buf)?;
        buf.truncate(n);
        return Ok(FileData::Owned(buf));
    }

    // SAFETY: read-only mapping; the kernels only read the input.
    match unsafe { MmapOptions::new().map(&file) } {
        Ok(mmap) => {
            #[cfg(target_os = "linux")]
            {
                if len >= 2 * 1024 * 1024 {
                    let _ = mmap.advise(memmap2::Advice::HugePage);
                }
                let _ = mmap.advise(memmap2::Advice::Sequential);
            }
            Ok(FileData::Mmap(mmap))
        }
        Err(_) => {
            let mut buf = Vec::with_capacity(len as usize);
            let mut reader = file;
            reader.read_to_end(&mut buf)?;
            Ok(FileData::Owned(buf))
        }
    }
}

/// Fills `buf` from `reader` until it is full or the reader reaches EOF,
/// retrying interrupted reads. Returns the bytes read; less than
/// `buf.len()` only at EOF.
#[inline]
pub fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}
