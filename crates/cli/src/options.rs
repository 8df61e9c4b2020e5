// crates/cli/src/options.rs
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Right-aligned columns followed by the file name
    #[default]
    Default,
    Csv,
    Json,
    Xml,
}

/// How a count is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizeFormat {
    /// Thousands separated by commas.
    #[default]
    Comma,
    /// SI units for bytes, commas for everything else.
    Human,
}
