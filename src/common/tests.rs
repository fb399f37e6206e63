use std::io::{self, Read, Write};

use super::io::{FileData, MMAP_THRESHOLD, read_file, read_full};
use super::{io_error_msg, tool_name};

/// Reader that returns at most `step` bytes per call and is interrupted
/// once before every successful read.
struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
    interrupt: bool,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt = !self.interrupt;
        if self.interrupt {
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        let n = self.step.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn test_tool_name_strips_prefix() {
    assert_eq!(tool_name("fprune"), "prune");
    assert_eq!(tool_name("prune"), "prune");
}

#[test]
fn test_io_error_msg_drops_os_suffix() {
    let e = io::Error::from_raw_os_error(libc::ENOENT);
    let msg = io_error_msg(&e);
    assert!(!msg.contains("os error"), "{}", msg);
    assert_eq!(io_error_msg(&io::Error::other("plain")), "plain");
}

#[test]
fn test_read_full_fills_across_short_reads() {
    let data = b"the quick brown fox";
    let mut reader = Trickle {
        data,
        step: 3,
        interrupt: false,
    };
    let mut buf = [0u8; 10];
    assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 10);
    assert_eq!(&buf, b"the quick ");

    let mut rest = [0u8; 32];
    assert_eq!(read_full(&mut reader, &mut rest).unwrap(), 9);
    assert_eq!(&rest[..9], b"brown fox");
    assert_eq!(read_full(&mut reader, &mut rest).unwrap(), 0);
}

#[test]
fn test_read_file_small_is_owned() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"a b c\n").unwrap();
    let data = read_file(file.path()).unwrap();
    assert!(matches!(data, FileData::Owned(_)));
    assert_eq!(&*data, b"a b c\n");
}

#[test]
fn test_read_file_large_matches_contents() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let content: Vec<u8> = (0..MMAP_THRESHOLD as usize + 4096).map(|i| (i % 251) as u8).collect();
    file.write_all(&content).unwrap();
    file.flush().unwrap();
    let data = read_file(file.path()).unwrap();
    assert_eq!(data.len(), content.len());
    assert!(*data == content[..]);
}

#[test]
fn test_read_file_empty() {
    let file = tempfile::NamedTempFile::new().unwrap();
    assert!(read_file(file.path()).unwrap().is_empty());
}

#[test]
fn test_read_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_file(&dir.path().join("absent")).err().unwrap();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}
