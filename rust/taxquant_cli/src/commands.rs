use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use std::fs::File;
use std::io::{
    BufReader,
    BufWriter,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use std::time::{
    Duration,
    Instant,
};
use taxquant::io::LcaTable;
use taxquant::io::plot_json::{
    write_abundance_chart,
    write_rank_counts,
    write_support_histogram,
};
use taxquant::{
    AbundanceParams,
    Dispatcher,
    HttpTaxonomyService,
    Rank,
    Resolver,
    TaxQuantError,
    aggregate,
    compute_distribution,
};
use tracing::{
    info,
    instrument,
};

use crate::cli::{
    DistributionArgs,
    Lca2QuantArgs,
    Pept2LcaArgs,
    WriteTemplateArgs,
};
use crate::config::Config;
use crate::error::CliError;

fn create(path: &Path) -> Result<BufWriter<File>, CliError> {
    let file = File::create(path).map_err(|e| TaxQuantError::from(e).with_path(path))?;
    Ok(BufWriter::new(file))
}

fn spinner() -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {pos} peptide rows ({per_sec})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let bar = ProgressBar::new_spinner().with_style(style);
    bar.enable_steady_tick(Duration::from_millis(200));
    bar
}

/// `<dir>/<stem>_<suffix>` for an output written next to `input`.
fn sibling_path(input: &Path, dir: Option<&Path>, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "lca".to_string());
    let dir = dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{}_{}", stem, suffix))
}

fn write_distribution(
    table: &LcaTable,
    lca_path: &Path,
    dir: Option<&Path>,
) -> Result<(), CliError> {
    let distribution = compute_distribution(table.resolved().map(|(_, record)| record));

    let counts_path = sibling_path(lca_path, dir, "rank_peptide_count.json");
    let mut out = create(&counts_path)?;
    write_rank_counts(&distribution, &mut out)?;
    out.flush()?;

    let support_path = sibling_path(lca_path, dir, "peptide_taxon_count.json");
    let mut out = create(&support_path)?;
    write_support_histogram(&distribution, &mut out)?;
    out.flush()?;

    let resolved = distribution.counts(Rank::Superkingdom).cumulative();
    info!(
        "{} of {} informative peptides resolved at some rank",
        resolved,
        distribution.peptides()
    );
    println!(
        "Wrote rank distribution to:\n- {}\n- {}",
        counts_path.display(),
        support_path.display()
    );
    Ok(())
}

/// Main function for the 'pept2lca' subcommand.
#[instrument]
pub fn main_pept2lca(args: Pept2LcaArgs) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            Config::from_path(path)?
        }
        None => Config::default(),
    };
    let config = config.with_cli_args(&args)?;
    info!("Using configuration: {:#?}", config);

    let service = HttpTaxonomyService::new(
        config.remote.lineage_url.clone(),
        config.remote.taxa_url.clone(),
        Duration::from_secs(config.remote.timeout_seconds),
    )?;
    let resolver = Resolver::new(service, config.retry.policy());
    let mut dispatcher =
        Dispatcher::new(resolver, config.dispatch.options()).with_progress(spinner());

    let start = Instant::now();
    let input =
        File::open(&args.input).map_err(|e| TaxQuantError::from(e).with_path(&args.input))?;
    let summary = dispatcher.run(BufReader::new(input), create(&args.output)?)?;
    println!(
        "Resolved {} of {} peptide rows ({} shards, {} taxa) in {:?}",
        summary.records - summary.unresolved_records,
        summary.records,
        summary.shards,
        dispatcher.resolver().cache().len(),
        start.elapsed()
    );
    println!("Wrote LCA table to: {}", args.output.display());

    if !args.skip_distribution {
        let table = LcaTable::from_path(&args.output)?;
        write_distribution(&table, &args.output, None)?;
    }
    Ok(())
}

/// Main function for the 'distribution' subcommand.
#[instrument]
pub fn main_distribution(args: DistributionArgs) -> Result<(), CliError> {
    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)?;
    }
    let table = LcaTable::from_path(&args.input)?;
    write_distribution(&table, &args.input, args.output_dir.as_deref())
}

/// Main function for the 'lca2quant' subcommand.
#[instrument]
pub fn main_lca2quant(args: Lca2QuantArgs) -> Result<(), CliError> {
    let table = LcaTable::from_path(&args.input)?;
    let params = AbundanceParams {
        rank: args.rank,
        min_peptides: args.min_peptides,
        log2: args.log2,
    };
    let abundance = aggregate(&table, params)?;

    let mut out = create(&args.output)?;
    taxquant::io::write_abundance(&abundance, &mut out)?;
    out.flush()?;
    println!(
        "Wrote {} taxa at {} level to: {}",
        abundance.rows.len(),
        args.rank,
        args.output.display()
    );

    if let Some(chart_path) = &args.chart_json {
        let mut out = create(chart_path)?;
        write_abundance_chart(&abundance, &mut out)?;
        out.flush()?;
        println!("Wrote abundance chart data to: {}", chart_path.display());
    }
    Ok(())
}

/// Main function for the 'write-template' subcommand.
pub fn main_write_template(args: WriteTemplateArgs) -> Result<(), CliError> {
    if let Some(parent) = args.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let template = serde_json::to_string_pretty(&Config::default())?;
    std::fs::write(&args.output_path, template)?;
    println!(
        "Wrote configuration template to: {}",
        args.output_path.display()
    );
    Ok(())
}
