use std::fs;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use ebd_diversity::app::App;
use ebd_diversity::artifact::DistanceArtifact;
use ebd_diversity::config::{ConfigLoader, ResolvedConfig};
use ebd_diversity::engine::SystemEngine;
use ebd_diversity::error::EbdError;
use ebd_diversity::output::{JsonOutput, OutputMode};
use ebd_diversity::table::AbundanceTable;
use ebd_diversity::tree::NewickTree;

const CITATION: &str = "\
@article{parks2013measures,
  title={Measures of phylogenetic differentiation provide robust and complementary insights into microbial communities},
  author={Parks, Donovan H and Beiko, Robert G},
  journal={The ISME Journal},
  volume={7},
  number={1},
  pages={173--183},
  year={2013},
  publisher={Nature Publishing Group}
}";

#[derive(Parser)]
#[command(name = "ebd-div")]
#[command(about = "Beta diversity distance matrices via the ExpressBetaDiversity engine")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true, help = "Path to the ExpressBetaDiversity binary")]
    engine: Option<Utf8PathBuf>,

    #[arg(long, global = true, help = "Path to an ebd.json config file")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        about = "Compute a beta diversity metric for all pairs of samples in a feature table"
    )]
    Beta(BetaArgs),
    #[command(
        name = "beta-phylogenetic",
        about = "Compute a phylogenetic beta diversity metric for all pairs of samples in a feature table"
    )]
    BetaPhylogenetic(BetaPhylogeneticArgs),
    #[command(about = "Render a principal-coordinates scatter plot from distance matrix artifacts")]
    Plot(PlotArgs),
    #[command(about = "List the recognized metric vocabularies")]
    Metrics,
    #[command(about = "Print the citation for the external distance engine")]
    Cite,
}

#[derive(Args, Clone)]
struct BetaArgs {
    #[arg(long, help = "Tab-separated feature table (samples as rows)")]
    table: Utf8PathBuf,

    #[arg(long, help = "The beta diversity metric to be computed")]
    metric: Option<String>,

    #[arg(long, help = "Use the weighted version of the metric")]
    weighted: bool,

    #[arg(long, short = 'o', help = "Where to write the distance matrix artifact")]
    output: Utf8PathBuf,
}

#[derive(Args, Clone)]
struct BetaPhylogeneticArgs {
    #[command(flatten)]
    beta: BetaArgs,

    #[arg(long, help = "Rooted newick tree whose tips cover the table's feature ids")]
    tree: Utf8PathBuf,
}

#[derive(Args, Clone)]
struct PlotArgs {
    #[arg(long, short = 'o', help = "Where to write the HTML plot")]
    output: Utf8PathBuf,

    #[arg(required = true, help = "Distance matrix artifacts produced by beta/beta-phylogenetic")]
    artifacts: Vec<Utf8PathBuf>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(ebd) = report.downcast_ref::<EbdError>() {
            return ExitCode::from(map_exit_code(ebd));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &EbdError) -> u8 {
    match error {
        EbdError::UnknownMetric(_)
        | EbdError::UnknownPhylogeneticMetric(_)
        | EbdError::EmptyInput
        | EbdError::InvalidTable(_)
        | EbdError::InvalidNewick(_)
        | EbdError::InvalidMatrix(_)
        | EbdError::SampleOrderMismatch
        | EbdError::Artifact { .. }
        | EbdError::ConfigRead(_)
        | EbdError::ConfigParse(_) => 2,
        EbdError::MissingTool(_) | EbdError::ExternalTool { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let config = ConfigLoader::resolve(cli.config.as_deref()).into_diagnostic()?;
    let engine_path = cli.engine.clone().or_else(|| config.engine.clone());

    match cli.command {
        Commands::Beta(args) => {
            let app = App::new(build_engine(engine_path)?);
            let table = load_table(&args.table)?;
            let (metric, weighted) = resolve_metric(&args, &config)?;
            let (matrix, provenance) = app.beta(&table, &metric, weighted).into_diagnostic()?;
            let result = app
                .save(&matrix, &provenance, &args.output)
                .into_diagnostic()?;
            print_beta(&result, output_mode)
        }
        Commands::BetaPhylogenetic(args) => {
            let app = App::new(build_engine(engine_path)?);
            let table = load_table(&args.beta.table)?;
            let tree = load_tree(&args.tree)?;
            let (metric, weighted) = resolve_metric(&args.beta, &config)?;
            let (matrix, provenance) = app
                .beta_phylogenetic(&table, &tree, &metric, weighted)
                .into_diagnostic()?;
            let result = app
                .save(&matrix, &provenance, &args.beta.output)
                .into_diagnostic()?;
            print_beta(&result, output_mode)
        }
        Commands::Plot(args) => {
            let app = App::new(NopEngine);
            let artifacts = args
                .artifacts
                .iter()
                .map(|path| DistanceArtifact::read(path))
                .collect::<Result<Vec<_>, EbdError>>()
                .into_diagnostic()?;
            let result = app.plot(&artifacts, &args.output).into_diagnostic()?;
            match output_mode {
                OutputMode::NonInteractive => JsonOutput::print_plot(&result).into_diagnostic()?,
                OutputMode::Interactive => {
                    println!(
                        "rendered {} panel(s) over {} samples to {}",
                        result.panels.len(),
                        result.samples,
                        result.plot_path
                    );
                    for panel in &result.panels {
                        println!("  - {panel}");
                    }
                }
            }
            Ok(())
        }
        Commands::Metrics => {
            let app = App::new(NopEngine);
            let result = app.metrics();
            match output_mode {
                OutputMode::NonInteractive => {
                    JsonOutput::print_metrics(&result).into_diagnostic()?
                }
                OutputMode::Interactive => {
                    println!("phylogenetic metrics:");
                    for metric in &result.phylogenetic {
                        println!("  {metric}");
                    }
                    println!("non-phylogenetic metrics:");
                    for metric in &result.non_phylogenetic {
                        println!("  {metric}");
                    }
                }
            }
            Ok(())
        }
        Commands::Cite => {
            println!("{CITATION}");
            Ok(())
        }
    }
}

fn build_engine(engine_path: Option<Utf8PathBuf>) -> miette::Result<SystemEngine> {
    match engine_path {
        Some(path) => Ok(SystemEngine::with_binary(path.into_std_path_buf())),
        None => SystemEngine::new().into_diagnostic(),
    }
}

fn resolve_metric(args: &BetaArgs, config: &ResolvedConfig) -> miette::Result<(String, bool)> {
    let metric = args
        .metric
        .clone()
        .or_else(|| config.metric.clone())
        .ok_or_else(|| {
            miette::Report::msg("metric required (pass --metric or set one in ebd.json)")
        })?;
    let weighted = args.weighted || config.weighted;
    Ok((metric, weighted))
}

fn load_table(path: &Utf8PathBuf) -> miette::Result<AbundanceTable> {
    let text = fs::read_to_string(path)
        .map_err(|err| EbdError::Filesystem(format!("read table {path}: {err}")))
        .into_diagnostic()?;
    AbundanceTable::parse_tsv(&text).into_diagnostic()
}

fn load_tree(path: &Utf8PathBuf) -> miette::Result<NewickTree> {
    let text = fs::read_to_string(path)
        .map_err(|err| EbdError::Filesystem(format!("read tree {path}: {err}")))
        .into_diagnostic()?;
    text.parse::<NewickTree>().into_diagnostic()
}

fn print_beta(
    result: &ebd_diversity::app::BetaResult,
    output_mode: OutputMode,
) -> miette::Result<()> {
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_beta(result).into_diagnostic()?,
        OutputMode::Interactive => {
            let label = if result.weighted {
                format!("{} (weighted)", result.metric)
            } else {
                result.metric.clone()
            };
            println!("computed {} distances for {} samples", label, result.samples);
            if let Some(path) = &result.artifact_path {
                println!("wrote {path}");
            }
        }
    }
    Ok(())
}

struct NopEngine;

impl ebd_diversity::engine::EngineRunner for NopEngine {
    fn run(&self, _workdir: &std::path::Path, _args: &[String]) -> Result<(), EbdError> {
        Err(EbdError::MissingTool(
            "distance engine not configured".to_string(),
        ))
    }
}
