use crate::counter::CounterKind;
use crate::sniff::DEFAULT_PREFIX_SIZE;
use derive_builder::Builder;
use std::path::PathBuf;

/// Default bound on concurrently running counting tasks.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// How raw arguments are turned into entries.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ReadOptions {
    /// Treat top-level files (and stdin) as newline-separated lists of inputs.
    #[builder(default)]
    pub file_list: bool,
    /// Skip `.gitignore` handling.
    #[builder(default)]
    pub no_ignore: bool,
    /// Count archives as opaque bytes instead of unpacking them.
    #[builder(default)]
    pub no_extract: bool,
    /// Keep a local copy of every downloaded URL.
    #[builder(default)]
    pub store_content: bool,
    /// Include dotfiles found while walking directories.
    #[builder(default)]
    pub hidden: bool,
    #[builder(default = "PathBuf::from(\".\")")]
    pub store_dir: PathBuf,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            file_list: false,
            no_ignore: false,
            no_extract: false,
            store_content: false,
            hidden: false,
            store_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct Config {
    #[builder(default)]
    pub read: ReadOptions,
    #[builder(default)]
    pub kind: CounterKind,
    /// `0` lifts the bound entirely.
    #[builder(default = "DEFAULT_MAX_CONCURRENCY")]
    pub max_concurrency: usize,
    #[builder(default = "DEFAULT_PREFIX_SIZE")]
    pub prefix_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            read: ReadOptions::default(),
            kind: CounterKind::ALL,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            prefix_size: DEFAULT_PREFIX_SIZE,
        }
    }
}
