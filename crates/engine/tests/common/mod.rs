// crates/engine/tests/common/mod.rs
//! Shared fixtures: poems with known counts, archive builders, a tiny HTTP
//! responder.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use wildcount_engine::config::{Config, ConfigBuilder, ReadOptions};
use wildcount_engine::entry::StdinHandle;
use wildcount_engine::{Category, Counter, Engine, RunResult};

/// 4 lines, 26 words, 142 characters, 142 bytes.
pub const HUMPTY_DUMPTY: &str = "Humpty Dumpty sat on a wall,\n\
Humpty Dumpty had a great fall.\n\
All the king's horses and all the king's men\n\
Couldn't put Humpty together again.\n";

/// 7 lines, 9 words, 50 characters, 132 bytes.
pub const SAKURA: &str = "さくら さくら\n\
やよいの空は\n\
見わたす限り\n\
かすみか雲か\n\
匂いぞ出ずる\n\
いざや いざや\n\
見にゆかん\n";

/// 2 lines, 10 words, 58 characters, 58 bytes.
pub const TWINKLE: &str = "Twinkle, twinkle, little star,\nHow I wonder what you are!\n";

pub fn counts(counter: &Counter) -> [Option<u64>; 4] {
    Category::ALL.map(|category| counter.count(category))
}

pub fn all(lines: u64, words: u64, chars: u64, bytes: u64) -> [Option<u64>; 4] {
    [Some(lines), Some(words), Some(chars), Some(bytes)]
}

pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn arg(&self, rel: &str) -> String {
        self.dir.path().join(rel).to_string_lossy().into_owned()
    }
}

pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in files {
        let options = zip::write::SimpleFileOptions::default();
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(body).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Single stored member whose zip64 extra fields claim `declared` bytes of
/// uncompressed content while only `body` is actually present.
pub fn zip64_lying_size(name: &str, body: &[u8], declared: u64) -> Vec<u8> {
    let mut crc = flate2::Crc::new();
    crc.update(body);
    let mut zip64 = Vec::new();
    zip64.extend_from_slice(&1u16.to_le_bytes());
    zip64.extend_from_slice(&16u16.to_le_bytes());
    zip64.extend_from_slice(&declared.to_le_bytes());
    zip64.extend_from_slice(&(body.len() as u64).to_le_bytes());

    let mut common = Vec::new();
    common.extend_from_slice(&45u16.to_le_bytes()); // version needed
    common.extend_from_slice(&0u16.to_le_bytes()); // flags
    common.extend_from_slice(&0u16.to_le_bytes()); // stored
    common.extend_from_slice(&0u16.to_le_bytes()); // time
    common.extend_from_slice(&0x21u16.to_le_bytes()); // 1980-01-01
    common.extend_from_slice(&crc.sum().to_le_bytes());
    common.extend_from_slice(&u32::MAX.to_le_bytes());
    common.extend_from_slice(&u32::MAX.to_le_bytes());
    common.extend_from_slice(&(name.len() as u16).to_le_bytes());
    common.extend_from_slice(&(zip64.len() as u16).to_le_bytes());

    let mut out = Vec::new();
    out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
    out.extend_from_slice(&common);
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(&zip64);
    out.extend_from_slice(body);

    let central_start = out.len();
    out.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
    out.extend_from_slice(&45u16.to_le_bytes()); // version made by
    out.extend_from_slice(&common);
    out.extend_from_slice(&0u16.to_le_bytes()); // comment
    out.extend_from_slice(&0u16.to_le_bytes()); // disk
    out.extend_from_slice(&0u16.to_le_bytes()); // internal attributes
    out.extend_from_slice(&0u32.to_le_bytes()); // external attributes
    out.extend_from_slice(&0u32.to_le_bytes()); // local header offset
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(&zip64);
    let central_size = out.len() - central_start;

    out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&(central_size as u32).to_le_bytes());
    out.extend_from_slice(&(central_start as u32).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}

pub fn tar_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, body) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *body).unwrap();
    }
    builder.into_inner().unwrap()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn bzip2(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn config(read: ReadOptions, max_concurrency: usize) -> Config {
    ConfigBuilder::default()
        .read(read)
        .max_concurrency(max_concurrency)
        .build()
        .unwrap()
}

pub fn client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder().no_proxy().build().unwrap()
}

pub fn run(config: Config, args: &[String]) -> RunResult {
    run_with_stdin(config, args, StdinHandle::new(std::io::empty()))
}

pub fn run_with_stdin(config: Config, args: &[String], stdin: StdinHandle) -> RunResult {
    Engine::with_client(config, client()).run(args, stdin).unwrap()
}

pub fn names(result: &RunResult) -> Vec<String> {
    result.results.iter().map(|r| r.name.clone()).collect()
}

/// Serves fixed bodies over HTTP/1.1 on an ephemeral port. Unknown paths get
/// a 404; paths registered with a status other than 200 get that status.
pub struct Server {
    base: String,
}

impl Server {
    pub fn start(routes: Vec<(&str, u16, Vec<u8>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let routes: Arc<HashMap<String, (u16, Vec<u8>)>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, status, body)| (path.to_owned(), (status, body)))
                .collect(),
        );
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                thread::spawn(move || {
                    let mut reader = BufReader::new(&stream);
                    let mut request_line = String::new();
                    if reader.read_line(&mut request_line).is_err() {
                        return;
                    }
                    loop {
                        let mut header = String::new();
                        match reader.read_line(&mut header) {
                            Ok(0) | Err(_) => break,
                            Ok(_) if header == "\r\n" => break,
                            Ok(_) => {}
                        }
                    }
                    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
                    let (status, body) = routes
                        .get(path)
                        .cloned()
                        .unwrap_or((404, b"not found".to_vec()));
                    let reason = match status {
                        200 => "OK",
                        404 => "Not Found",
                        _ => "Error",
                    };
                    let mut out = &stream;
                    let _ = write!(
                        out,
                        "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    let _ = out.write_all(&body);
                    let _ = out.flush();
                });
            }
        });
        Self { base }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}
