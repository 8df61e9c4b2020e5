//! Read-ahead type detection.

use std::io::{self, Read};

/// Bytes buffered before classification; covers the tar magic at offset 257.
pub const DEFAULT_PREFIX_SIZE: usize = 368;

/// Content type recognised from magic bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
    Zip,
    Tar,
    Gzip,
    Bzip2,
    /// Recognised, but not something the engine unpacks.
    Other(&'static str),
    Unknown,
}

impl FileType {
    pub fn detect(prefix: &[u8]) -> Self {
        match infer::get(prefix).map(|t| t.extension()) {
            Some("zip" | "jar") => FileType::Zip,
            Some("tar") => FileType::Tar,
            Some("gz") => FileType::Gzip,
            Some("bz2") => FileType::Bzip2,
            Some(ext) => FileType::Other(ext),
            None => FileType::Unknown,
        }
    }

    pub const fn is_compression(self) -> bool {
        matches!(self, FileType::Gzip | FileType::Bzip2)
    }

    pub const fn is_archive(self) -> bool {
        matches!(self, FileType::Zip | FileType::Tar)
    }
}

/// Reader that peeks at the head of a stream and then replays it.
///
/// Consumers see every byte of the inner stream exactly once, the buffered
/// prefix first.
pub struct Sniffer<R> {
    prefix: Vec<u8>,
    pos: usize,
    inner: R,
}

impl<R: Read> Sniffer<R> {
    pub fn new(inner: R) -> io::Result<Self> {
        Self::with_prefix_size(inner, DEFAULT_PREFIX_SIZE)
    }

    /// Primes up to `size` bytes; a shorter stream is not an error.
    pub fn with_prefix_size(mut inner: R, size: usize) -> io::Result<Self> {
        let mut prefix = Vec::with_capacity(size);
        inner.by_ref().take(size as u64).read_to_end(&mut prefix)?;
        Ok(Self {
            prefix,
            pos: 0,
            inner,
        })
    }

    pub fn read_type(&self) -> FileType {
        FileType::detect(&self.prefix)
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for Sniffer<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.prefix.len() {
            let n = (&self.prefix[self.pos..]).read(buf)?;
            self.pos += n;
            return Ok(n);
        }
        self.inner.read(buf)
    }
}

/// Cheap suffix check for names that look like archives. The engine never
/// trusts it; classification always goes by content.
pub fn is_archive_name(name: &str) -> bool {
    const SUFFIXES: [&str; 5] = [".zip", ".tar", ".tar.gz", ".tar.bz2", ".jar"];
    SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}
