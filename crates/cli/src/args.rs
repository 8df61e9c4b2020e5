// crates/cli/src/args.rs
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

use crate::options::OutputFormat;

/// Top-level CLI arguments parsed via clap.
#[derive(Parser, Debug)]
#[command(
    name = "wildcount",
    version = crate::VERSION,
    about = "Counts lines, words, characters, and bytes of files, directories, urls, and archives",
    after_help = "With no FILE|DIR|URL, standard input is counted (or read as a file list with -@)."
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Args {
    /// Print the number of bytes
    #[arg(short = 'b', long = "byte", help_heading = "Counting")]
    pub bytes: bool,

    /// Print the number of lines
    #[arg(short = 'l', long = "line", help_heading = "Counting")]
    pub lines: bool,

    /// Print the number of characters
    #[arg(short = 'c', long = "character", help_heading = "Counting")]
    pub characters: bool,

    /// Print the number of words
    #[arg(short = 'w', long = "word", help_heading = "Counting")]
    pub words: bool,

    /// Treat the arguments (or standard input) as lists of inputs, one per line
    #[arg(short = '@', long = "filelist", help_heading = "Input")]
    pub file_list: bool,

    /// Do not honour `.gitignore` files
    #[arg(short = 'n', long, help_heading = "Input")]
    pub no_ignore: bool,

    /// Count archives as they are instead of their entries
    #[arg(short = 'N', long = "no-extract-archive", help_heading = "Input")]
    pub no_extract: bool,

    /// Include dotfiles while walking directories
    #[arg(short = 'a', long, help_heading = "Input")]
    pub hidden: bool,

    /// Store the contents of every counted url
    #[arg(short = 'S', long, help_heading = "Input")]
    pub store_content: bool,

    /// Directory receiving stored url contents
    #[arg(long, value_name = "DIR", default_value = ".", value_hint = ValueHint::DirPath, help_heading = "Input")]
    pub store_dir: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "default", help_heading = "Output")]
    pub format: OutputFormat,

    /// Print sizes in human readable form (e.g. 1.2 kB)
    #[arg(short = 'H', long, help_heading = "Output")]
    pub humanize: bool,

    /// Write the result to DEST instead of standard output
    #[arg(short = 'o', long = "output", value_name = "DEST", value_hint = ValueHint::FilePath, help_heading = "Output")]
    pub dest: Option<PathBuf>,

    /// Maximum number of concurrently counted inputs; 0 or less means unbounded
    #[arg(
        short = 'j',
        long,
        value_name = "N",
        default_value_t = 10,
        allow_negative_numbers = true,
        help_heading = "Behavior"
    )]
    pub max_concurrency: i64,

    /// Log more details to standard error (repeat for trace output)
    #[arg(short = 'v', long, action = ArgAction::Count, help_heading = "Behavior")]
    pub verbose: u8,

    /// Files, directories, and urls to count
    #[arg(value_name = "FILE|DIR|URL")]
    pub arguments: Vec<String>,
}
