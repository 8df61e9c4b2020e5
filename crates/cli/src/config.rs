// crates/cli/src/config.rs
use crate::args::Args;
use crate::options::SizeFormat;
pub use wildcount_engine::config::{Config, ConfigBuilder, ReadOptions, ReadOptionsBuilder};
use wildcount_engine::{Category, CounterKind};

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        let read = ReadOptionsBuilder::default()
            .file_list(args.file_list)
            .no_ignore(args.no_ignore)
            .no_extract(args.no_extract)
            .store_content(args.store_content)
            .hidden(args.hidden)
            .store_dir(args.store_dir.clone())
            .build()
            .unwrap_or_default();

        ConfigBuilder::default()
            .read(read)
            .kind(counter_kind(args))
            .max_concurrency(usize::try_from(args.max_concurrency).unwrap_or(0))
            .build()
            .unwrap_or_default()
    }
}

/// Categories picked on the command line; none picked means all of them.
pub fn counter_kind(args: &Args) -> CounterKind {
    let picked = [
        (args.lines, Category::Lines),
        (args.words, Category::Words),
        (args.characters, Category::Characters),
        (args.bytes, Category::Bytes),
    ];
    let kind = picked
        .into_iter()
        .filter(|(on, _)| *on)
        .fold(CounterKind::NONE, |kind, (_, category)| {
            kind | CounterKind::from(category)
        });
    if kind.is_empty() { CounterKind::ALL } else { kind }
}

pub const fn size_format(args: &Args) -> SizeFormat {
    if args.humanize {
        SizeFormat::Human
    } else {
        SizeFormat::Comma
    }
}
