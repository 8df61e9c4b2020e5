//! Countable inputs.
//!
//! An [`Entry`] is a cheap, sendable description of something that can be
//! opened as a byte stream: a local file, a URL (optionally persisted while it
//! is read), standard input, a decompressed view of another entry, or a member
//! of a zip archive already held in memory.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use reqwest::blocking::Client;

use crate::counter::{Counter, CounterKind};
use crate::error::{EngineError, Outcome, Result};
use crate::order::Order;
use crate::results::Record;
use crate::tee::TeeReader;

/// Opened input. Not `Send`: tar members borrow their container's reader.
pub type Stream<'a> = Box<dyn Read + 'a>;

/// Zip archive held in memory with its central directory already parsed.
pub type ZipBuffer = zip::ZipArchive<Cursor<Arc<[u8]>>>;

pub const STDIN_NAME: &str = "<stdin>";

/// Shared handle on the process input.
///
/// Every clone reads from the same underlying stream, so opening stdin twice
/// continues where the previous reader stopped instead of starting over.
#[derive(Clone)]
pub struct StdinHandle(Arc<Mutex<Box<dyn Read + Send>>>);

impl StdinHandle {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self(Arc::new(Mutex::new(Box::new(reader))))
    }

    pub fn process() -> Self {
        Self::new(io::stdin())
    }
}

impl Read for StdinHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut inner = self
            .0
            .lock()
            .map_err(|_| io::Error::other("stdin reader poisoned"))?;
        inner.read(buf)
    }
}

impl fmt::Debug for StdinHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StdinHandle")
    }
}

/// Compression layer wrapped around an inner entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Codec {
    Gzip,
    Bzip2,
}

impl Codec {
    pub fn decode<'a, R: Read + 'a>(self, reader: R) -> Stream<'a> {
        match self {
            Codec::Gzip => Box::new(flate2::read::MultiGzDecoder::new(reader)),
            Codec::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(reader)),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Source {
    File(PathBuf),
    Url(Client),
    /// URL whose body is also written to `dir/<basename>`.
    Download { client: Client, dir: PathBuf },
    Stdin(StdinHandle),
    Compressed { inner: Box<Source>, codec: Codec },
    /// Member `index` of a zip archive buffered in memory. Clones share the
    /// parsed central directory.
    ZipMember { archive: ZipBuffer, index: usize },
}

/// Named, ordered input that can be opened and counted.
#[derive(Clone, Debug)]
pub struct Entry {
    name: String,
    order: Order,
    source: Source,
}

impl Entry {
    pub fn new(name: impl Into<String>, order: Order, source: Source) -> Self {
        Self {
            name: name.into(),
            order,
            source,
        }
    }

    pub fn file(path: impl AsRef<Path>, order: Order) -> Self {
        let path = path.as_ref();
        Self::new(
            path.to_string_lossy(),
            order,
            Source::File(path.to_path_buf()),
        )
    }

    pub fn url(url: impl Into<String>, order: Order, client: Client) -> Self {
        Self::new(url, order, Source::Url(client))
    }

    pub fn download(
        url: impl Into<String>,
        order: Order,
        client: Client,
        dir: impl Into<PathBuf>,
    ) -> Self {
        Self::new(
            url,
            order,
            Source::Download {
                client,
                dir: dir.into(),
            },
        )
    }

    pub fn stdin(order: Order, handle: StdinHandle) -> Self {
        Self::new(STDIN_NAME, order, Source::Stdin(handle))
    }

    /// Same name and order, content seen through `codec`.
    pub fn compressed(self, codec: Codec) -> Self {
        Self {
            name: self.name,
            order: self.order,
            source: Source::Compressed {
                inner: Box::new(self.source),
                codec,
            },
        }
    }

    pub fn zip_member(name: impl Into<String>, order: Order, archive: ZipBuffer, index: usize) -> Self {
        Self::new(name, order, Source::ZipMember { archive, index })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn open(&self) -> Result<Stream<'static>> {
        open_source(&self.name, &self.source)
    }

    /// Opens the entry and drains it into a fresh counter.
    pub fn count(&self, kind: CounterKind) -> Outcome {
        let stream = self.open()?;
        count_stream(&self.name, &self.order, stream, kind)
    }
}

fn open_source(name: &str, source: &Source) -> Result<Stream<'static>> {
    match source {
        Source::File(path) => File::open(path)
            .map(|file| Box::new(file) as Stream<'static>)
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => EngineError::NotFound {
                    name: name.to_owned(),
                },
                _ => EngineError::Open {
                    name: name.to_owned(),
                    source: err,
                },
            }),
        Source::Url(client) => Ok(Box::new(fetch(client, name)?)),
        Source::Download { client, dir } => {
            let response = fetch(client, name)?;
            let dest = dir.join(store_name(name));
            log::debug!("{name}: storing content to {}", dest.display());
            Ok(Box::new(TeeReader::create(response, dest)))
        }
        Source::Stdin(handle) => Ok(Box::new(handle.clone())),
        Source::Compressed { inner, codec } => {
            let stream = open_source(name, inner)?;
            Ok(codec.decode(stream))
        }
        Source::ZipMember { archive, index } => {
            let mut archive = archive.clone();
            let mut member = archive
                .by_index(*index)
                .map_err(|err| EngineError::decode(name, err))?;
            // the declared size is not trusted for allocation
            let mut content = Vec::new();
            member
                .read_to_end(&mut content)
                .map_err(|err| EngineError::read(name, err))?;
            Ok(Box::new(Cursor::new(content)))
        }
    }
}

fn fetch(client: &Client, url: &str) -> Result<reqwest::blocking::Response> {
    let response = client.get(url).send().map_err(|source| EngineError::Http {
        name: url.to_owned(),
        source,
    })?;
    match response.status() {
        StatusCode::NOT_FOUND => Err(EngineError::UrlNotFound {
            name: url.to_owned(),
        }),
        status if !status.is_success() => Err(EngineError::HttpStatus {
            name: url.to_owned(),
            status,
        }),
        _ => Ok(response),
    }
}

/// File name a downloaded URL is stored under: the last path segment, or
/// `index.html` when the path has none.
pub fn store_name(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_owned))
        })
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| "index.html".to_owned())
}

/// True for absolute URLs with a host, e.g. `https://example.com/a.txt`.
pub fn is_url(item: &str) -> bool {
    reqwest::Url::parse(item).is_ok_and(|url| url.has_host())
}

/// Name of a container member: `archive.zip!dir/file.txt`.
pub fn member_name(container: &str, member: &str) -> String {
    format!("{container}!{member}")
}

/// Drains `reader` into a fresh counter and wraps the tally in a record.
pub fn count_stream<R: Read>(name: &str, order: &Order, reader: R, kind: CounterKind) -> Outcome {
    let mut counter = Counter::new(kind);
    counter
        .drain(reader)
        .map_err(|err| EngineError::read(name, err))?;
    Ok(vec![Record::new(name, order.clone(), counter)])
}
