use clap::{
    Parser,
    Subcommand,
};
use std::path::PathBuf;
use taxquant::Rank;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the lineage of every peptide and write the LCA table.
    Pept2lca(Pept2LcaArgs),
    /// Compute the peptide rank distribution of an LCA table.
    Distribution(DistributionArgs),
    /// Aggregate sample quantities of an LCA table per taxon.
    Lca2quant(Lca2QuantArgs),
    /// Write a template configuration file.
    WriteTemplate(WriteTemplateArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct Pept2LcaArgs {
    /// Tab separated peptide file, sequence in the first column.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the LCA table.
    #[arg(short, long)]
    pub output: PathBuf,

    /// The path to the json configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Treat isoleucine and leucine as equal (overrides the config).
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub equate_il: Option<bool>,

    /// Let the service match missed cleavages (overrides the config).
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub missed_cleavage: Option<bool>,

    /// Peptide rows per request (overrides the config).
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Do not write the rank distribution next to the LCA table.
    #[arg(long)]
    pub skip_distribution: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DistributionArgs {
    /// LCA table written by `pept2lca`.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory for the JSON files, defaults to the one of the input.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct Lca2QuantArgs {
    /// LCA table written by `pept2lca`, with sample columns.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Rank to aggregate at, e.g. "genus" or "species group".
    #[arg(short, long)]
    pub rank: Rank,

    /// Minimum number of peptides a taxon needs to be reported.
    #[arg(short, long, default_value_t = 1)]
    pub min_peptides: usize,

    /// Report log2 ratios instead of percentages.
    #[arg(long)]
    pub log2: bool,

    /// Where to write the abundance table.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Also write the abundance as JSON for plotting.
    #[arg(long)]
    pub chart_json: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct WriteTemplateArgs {
    /// The path to the output file.
    #[arg(short, long)]
    pub output_path: PathBuf,
}
