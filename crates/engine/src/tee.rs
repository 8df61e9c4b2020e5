use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// Copies everything it reads into a local file.
///
/// A failing copy never interrupts the read side. The first write error is
/// kept and reported once the inner reader hits EOF, wrapped as
/// [`EngineError::Write`] inside the returned `io::Error`.
pub struct TeeReader<R, W = File> {
    reader: R,
    writer: Option<W>,
    path: PathBuf,
    failure: Option<io::Error>,
    reported: bool,
}

impl<R: Read> TeeReader<R, File> {
    /// Creates `path` and tees into it. A creation failure is deferred the
    /// same way a write failure is.
    pub fn create(reader: R, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        match File::create(&path) {
            Ok(file) => Self::new(reader, file, path),
            Err(err) => Self {
                reader,
                writer: None,
                path,
                failure: Some(err),
                reported: false,
            },
        }
    }
}

impl<R: Read, W: Write> TeeReader<R, W> {
    pub fn new(reader: R, writer: W, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            writer: Some(writer),
            path: path.into(),
            failure: None,
            reported: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn copy(&mut self, data: &[u8]) {
        if let Some(writer) = self.writer.as_mut()
            && let Err(err) = writer.write_all(data)
        {
            self.failure = Some(err);
            self.writer = None;
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        if let Some(mut writer) = self.writer.take()
            && let Err(err) = writer.flush()
        {
            self.failure.get_or_insert(err);
        }
        match self.failure.take() {
            Some(source) if !self.reported => {
                self.reported = true;
                Err(io::Error::other(EngineError::Write {
                    path: self.path.clone(),
                    source,
                }))
            }
            _ => Ok(()),
        }
    }
}

impl<R: Read, W: Write> Read for TeeReader<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n == 0 {
            self.finish()?;
            return Ok(0);
        }
        self.copy(&buf[..n]);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_copy_matches_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copy.txt");
        let mut tee = TeeReader::create(&b"one\ntwo\n"[..], &path);

        let mut out = String::new();
        tee.read_to_string(&mut out).unwrap();

        assert_eq!(out, "one\ntwo\n");
        drop(tee);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_write_failure_surfaces_after_reading() {
        let mut tee = TeeReader::new(&b"payload\n"[..], BrokenWriter, "copy.txt");
        let mut buf = [0u8; 64];

        // the reader side keeps working
        let n = tee.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"payload\n");

        let err = tee.read(&mut buf).unwrap_err();
        let engine = err.downcast::<EngineError>().unwrap();
        assert!(matches!(engine, EngineError::Write { ref path, .. } if path == Path::new("copy.txt")));

        // reported once
        assert_eq!(tee.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_create_failure_is_deferred() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("copy.txt");
        let mut tee = TeeReader::create(&b"abc"[..], &path);

        let mut buf = [0u8; 8];
        assert_eq!(tee.read(&mut buf).unwrap(), 3);
        assert!(tee.read(&mut buf).is_err());
    }
}
