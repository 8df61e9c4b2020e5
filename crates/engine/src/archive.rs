//! Archive detection and member enumeration.
//!
//! Containers are recognised by content only. Compression layers (gzip,
//! bzip2) are peeled off one after another until a zip, a tar or plain data
//! shows up underneath.

use std::io::{Cursor, Read};
use std::sync::Arc;

use crate::entry::{Codec, Entry, Stream, member_name};
use crate::error::{EngineError, Result};
use crate::order::Order;
use crate::sniff::{FileType, Sniffer, is_archive_name};

/// What an opened input turned out to be once compression is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Leaf,
    Zip,
    Tar,
}

/// A sniffed stream, positioned at its first byte.
pub struct Layers<'a> {
    pub shape: Shape,
    pub codecs: Vec<Codec>,
    pub stream: Stream<'a>,
}

/// Sniffs `stream`, decoding compression layers as they are found.
pub fn sniff_layers<'a>(name: &str, stream: Stream<'a>, prefix_size: usize) -> Result<Layers<'a>> {
    let mut codecs = Vec::new();
    let mut stream = stream;
    loop {
        let sniffer = Sniffer::with_prefix_size(stream, prefix_size)
            .map_err(|err| EngineError::read(name, err))?;
        let file_type = sniffer.read_type();
        let codec = match file_type {
            FileType::Gzip => Codec::Gzip,
            FileType::Bzip2 => Codec::Bzip2,
            other => {
                let shape = match other {
                    FileType::Zip => Shape::Zip,
                    FileType::Tar => Shape::Tar,
                    _ => Shape::Leaf,
                };
                return Ok(Layers {
                    shape,
                    codecs,
                    stream: Box::new(sniffer),
                });
            }
        };
        log::trace!("{name}: {codec:?} layer");
        codecs.push(codec);
        stream = codec.decode(sniffer);
    }
}

/// An entry after classification, with its stream already open.
pub struct Classified {
    pub entry: Entry,
    pub shape: Shape,
    pub stream: Stream<'static>,
}

/// Opens `entry` and determines its shape. Each compression layer wraps the
/// entry in a compressed entry so `entry` describes the decoded content.
pub fn classify(entry: Entry, prefix_size: usize) -> Result<Classified> {
    let stream = entry.open()?;
    let layers = sniff_layers(entry.name(), stream, prefix_size)?;
    let looks_like_archive = is_archive_name(entry.name());
    if looks_like_archive != (layers.shape != Shape::Leaf) {
        log::debug!(
            "{}: extension and content disagree, treating as {:?}",
            entry.name(),
            layers.shape
        );
    }
    let entry = layers
        .codecs
        .iter()
        .fold(entry, |entry, codec| entry.compressed(*codec));
    Ok(Classified {
        entry,
        shape: layers.shape,
        stream: layers.stream,
    })
}

/// Buffers a zip archive and lists its members in directory order.
///
/// The central directory sits at the end of the file, so the whole stream
/// has to be read first.
pub fn zip_members<R: Read>(name: &str, order: &Order, mut stream: R) -> Result<Vec<Entry>> {
    let mut buf = Vec::new();
    stream
        .read_to_end(&mut buf)
        .map_err(|err| EngineError::read(name, err))?;
    let data: Arc<[u8]> = Arc::from(buf);

    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|err| EngineError::decode(name, err))?;
    let mut members = Vec::with_capacity(archive.len());
    let mut member_order = order.sub();
    for index in 0..archive.len() {
        let member = archive
            .by_index_raw(index)
            .map_err(|err| EngineError::decode(name, err))?
            .name()
            .to_owned();
        members.push(Entry::zip_member(
            member_name(name, &member),
            member_order.clone(),
            archive.clone(),
            index,
        ));
        member_order = member_order.next();
    }
    Ok(members)
}

/// Walks a tar archive header by header.
///
/// Members share the archive's reader, so `visit` gets each one in turn and
/// the next header is read only after it returns.
pub fn tar_members<R, F>(name: &str, order: &Order, stream: R, mut visit: F) -> Result<()>
where
    R: Read,
    F: FnMut(String, Order, Stream<'_>),
{
    let mut archive = tar::Archive::new(stream);
    let entries = archive
        .entries()
        .map_err(|err| EngineError::decode(name, err))?;
    let mut member_order = order.sub();
    for item in entries {
        let member = item.map_err(|err| EngineError::decode(name, err))?;
        let path = member
            .path()
            .map_err(|err| EngineError::decode(name, err))?
            .to_string_lossy()
            .into_owned();
        visit(member_name(name, &path), member_order.clone(), Box::new(member));
        member_order = member_order.next();
    }
    Ok(())
}
