use std::path::{Path, PathBuf};
use std::process::ExitCode;

use analyzer::overlay::draw_minutiae;
use analyzer::{AnalyzerConfig, ComparisonReport, FingerprintFeatures, FingerprintSummary};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Fingerprint minutiae extraction and comparison", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// JSON file overriding the default thresholds and tables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyse a single fingerprint image
    Analyze {
        image: PathBuf,

        /// Write the enhanced image with minutiae marked
        #[arg(long)]
        overlay: Option<PathBuf>,

        /// Write the ridge skeleton
        #[arg(long)]
        skeleton: Option<PathBuf>,
    },
    /// Compare a reference print with a latent print
    Compare { reference: PathBuf, latent: PathBuf },
}

#[derive(Serialize)]
struct Analysis<'a> {
    file: &'a Path,
    #[serde(flatten)]
    summary: FingerprintSummary,
}

#[derive(Serialize)]
struct Comparison<'a> {
    reference: Analysis<'a>,
    latent: Analysis<'a>,
    comparison: ComparisonReport,
}

fn initialize_logging() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set subscriber: {e}");
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    initialize_logging();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> analyzer::Result<()> {
    let config = match &args.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };

    match &args.command {
        Commands::Analyze {
            image,
            overlay,
            skeleton,
        } => {
            let features = FingerprintFeatures::open(image, &config)?;
            if let Some(path) = overlay {
                draw_minutiae(&features.enhanced, &features.minutiae).save(path)?;
                info!("Wrote minutiae overlay to {}", path.display());
            }
            if let Some(path) = skeleton {
                features.skeleton.as_image().save(path)?;
                info!("Wrote skeleton to {}", path.display());
            }

            let analysis = Analysis {
                file: image,
                summary: features.summary(&config),
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_analysis(&analysis);
            }
        }
        Commands::Compare { reference, latent } => {
            let first = FingerprintFeatures::open(reference, &config)?;
            let second = FingerprintFeatures::open(latent, &config)?;
            let comparison = Comparison {
                reference: Analysis {
                    file: reference,
                    summary: first.summary(&config),
                },
                latent: Analysis {
                    file: latent,
                    summary: second.summary(&config),
                },
                comparison: ComparisonReport::new(&first, &second, &config.matching),
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                print_comparison(&comparison);
            }
        }
    }
    Ok(())
}

fn print_analysis(analysis: &Analysis) {
    let s = &analysis.summary;
    println!("{}", analysis.file.display());
    println!("  dimensions      {}x{} ({} channel(s))", s.width, s.height, s.channels);
    println!(
        "  pattern         {} ({:.1}%)",
        s.pattern,
        s.pattern_confidence * 100.
    );
    if let Some(description) = &s.pattern_description {
        println!("                  {description}");
    }
    println!("  hand            {} ({:.1}%)", s.hand, s.hand_confidence * 100.);
    println!(
        "  finger          {} ({:.1}%)",
        s.finger.finger,
        s.finger.confidence * 100.
    );
    for (finger, p) in s.finger.probabilities.iter() {
        println!("    {:<16}{:.1}%", finger.to_string(), p * 100.);
    }
    println!(
        "  minutiae        {} ({} ridge endings, {} bifurcations)",
        s.minutiae_count, s.minutiae.ridge_endings, s.minutiae.bifurcations
    );
}

fn print_comparison(comparison: &Comparison) {
    print_analysis(&comparison.reference);
    print_analysis(&comparison.latent);

    let report = &comparison.comparison;
    let r = &report.result;
    println!();
    println!("similarity        {:.1}% ({})", r.similarity_score, r.match_level);
    println!("  pattern         {:.1}%", r.pattern_similarity);
    println!("  minutiae        {:.1}%", r.minutiae_similarity);
    println!("  matched         {}", r.matched_minutiae_count);
    println!(
        "  same pattern    {}",
        if report.pattern_match { "yes" } else { "no" }
    );
    println!(
        "  same hand       {}",
        if report.hand_match { "yes" } else { "no" }
    );
    println!("  count diff      {}", report.minutiae_difference);
    println!();
    println!("{}", report.conclusion);
    println!("{}", report.recommendation);
}
