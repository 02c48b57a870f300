use std::path::PathBuf;
use std::process::ExitCode;

use ciphermark::identity::chart_title;
use ciphermark::{
    Algorithm, AlgorithmConfig, CampaignConfig, CampaignRunner, FillMode, KeyPolicy,
    OutputNamespacing, OutputPaths, PayloadSpec, RunIdentity, Scenario, render, results, stats,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ciphermark", about = "Round-trip timing comparison of symmetric ciphers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Fill {
    Random,
    Pattern,
}

#[derive(Clone, Copy, ValueEnum)]
enum Keys {
    /// Fresh key for every algorithm and size
    PerCell,
    /// One key per size, shared by all algorithms
    Shared,
}

#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    Flat,
    PlatformTagged,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a campaign, persist the results and draw the chart
    Run {
        /// Built-in scenario: synthetic, image or video
        #[arg(long, env = "CIPHERMARK_SCENARIO", default_value = "synthetic")]
        scenario: Scenario,

        /// Synthetic payload sizes in MB, replacing the scenario's sizes
        #[arg(long, value_delimiter = ',')]
        sizes: Option<Vec<f64>>,

        /// Algorithms to compare, in order
        #[arg(long, value_delimiter = ',')]
        algorithms: Option<Vec<Algorithm>>,

        /// Asset file for the image or video scenario
        #[arg(long, env = "CIPHERMARK_ASSET")]
        asset: Option<PathBuf>,

        /// Associated-data length for AEAD algorithms
        #[arg(long, default_value_t = ciphermark::DEFAULT_ASSOCIATED_DATA_LEN)]
        associated_data_len: usize,

        #[arg(long, value_enum, default_value_t = Fill::Random)]
        fill: Fill,

        #[arg(long, value_enum, default_value_t = Keys::PerCell)]
        keys: Keys,

        /// Seed for keys, nonces and synthetic payloads
        #[arg(long, env = "CIPHERMARK_SEED")]
        seed: Option<u64>,

        /// Directory for result files and charts
        #[arg(short, long, env = "CIPHERMARK_OUT_DIR", default_value = "results")]
        out_dir: PathBuf,

        #[arg(long, value_enum, default_value_t = Layout::PlatformTagged)]
        layout: Layout,

        /// Skip drawing the chart
        #[arg(long)]
        no_chart: bool,
    },
    /// Draw the chart for an existing result file
    Render {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Chart title (defaults to one naming this host)
        #[arg(long)]
        title: Option<String>,
    },
    /// Print the summary table for an existing result file
    Summary {
        #[arg(short, long)]
        input: PathBuf,
    },
}

struct RunArgs {
    scenario: Scenario,
    sizes: Option<Vec<f64>>,
    algorithms: Option<Vec<Algorithm>>,
    asset: Option<PathBuf>,
    associated_data_len: usize,
    fill: Fill,
    keys: Keys,
    seed: Option<u64>,
    out_dir: PathBuf,
    layout: Layout,
}

fn campaign_config(args: RunArgs) -> CampaignConfig {
    let mut config = CampaignConfig::for_scenario(args.scenario, args.asset);
    if let Some(algorithms) = args.algorithms {
        config.algorithms = algorithms
            .into_iter()
            .map(|a| AlgorithmConfig::new(a, args.associated_data_len))
            .collect();
    }
    if let Some(sizes) = args.sizes {
        // Keep any asset payloads, replace the synthetic ones.
        let assets = config
            .payloads
            .into_iter()
            .filter(|p| matches!(p.source, ciphermark::PayloadSource::Asset(_)));
        config.payloads = sizes.into_iter().map(PayloadSpec::synthetic).chain(assets).collect();
    }
    CampaignConfig {
        fill: match args.fill {
            Fill::Random => FillMode::Random,
            Fill::Pattern => FillMode::Pattern,
        },
        key_policy: match args.keys {
            Keys::PerCell => KeyPolicy::PerCell,
            Keys::Shared => KeyPolicy::SharedAcrossAlgorithms,
        },
        seed: args.seed,
        output_dir: args.out_dir,
        namespacing: match args.layout {
            Layout::Flat => OutputNamespacing::Flat,
            Layout::PlatformTagged => OutputNamespacing::PlatformTagged,
        },
        ..config
    }
    .with_associated_data_len(args.associated_data_len)
}

fn run(args: RunArgs, no_chart: bool) -> anyhow::Result<ExitCode> {
    let config = campaign_config(args);
    let identity = RunIdentity::detect();
    let tag = config.input_tag.clone();
    let paths = OutputPaths::new(&config.output_dir, config.namespacing, &identity, tag.as_deref());
    tracing::info!(host = %identity, results = %paths.results.display(), "starting campaign");

    let campaign = CampaignRunner::new(config)?.run()?;

    // Persistence and rendering failures leave the campaign intact; report
    // them through the exit status and still print the summary.
    let mut code = ExitCode::SUCCESS;
    match results::persist(&campaign, &paths.results) {
        Ok(()) => println!("Results: {}", paths.results.display()),
        Err(e) if !e.is_fatal() => {
            tracing::error!(error = %e, "could not persist results");
            code = ExitCode::FAILURE;
        }
        Err(e) => return Err(e.into()),
    }
    if !no_chart {
        let title = chart_title(&identity, tag.as_deref());
        match render::render(&campaign, &title, &paths.chart) {
            Ok(()) => println!("Chart: {}", paths.chart.display()),
            Err(e) if !e.is_fatal() => {
                tracing::error!(error = %e, "could not render chart");
                code = ExitCode::FAILURE;
            }
            Err(e) => return Err(e.into()),
        }
    }
    print!("{}", stats::format_summary(&stats::summarize(&campaign)));
    Ok(code)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            sizes,
            algorithms,
            asset,
            associated_data_len,
            fill,
            keys,
            seed,
            out_dir,
            layout,
            no_chart,
        } => {
            let args = RunArgs {
                scenario,
                sizes,
                algorithms,
                asset,
                associated_data_len,
                fill,
                keys,
                seed,
                out_dir,
                layout,
            };
            run(args, no_chart)
        }
        Commands::Render {
            input,
            output,
            title,
        } => {
            let campaign = results::load(&input)?;
            let title = title.unwrap_or_else(|| chart_title(&RunIdentity::detect(), None));
            render::render(&campaign, &title, &output)?;
            println!("Chart: {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Summary { input } => {
            let campaign = results::load(&input)?;
            campaign.validate()?;
            print!("{}", stats::format_summary(&stats::summarize(&campaign)));
            Ok(ExitCode::SUCCESS)
        }
    }
}
