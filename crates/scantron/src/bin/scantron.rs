use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use scantron::dataset;
use scantron::mark::{resolve_outcomes, Color, ExportFormat, MarkStyle};
use scantron::{AnswerKeyEntry, QuestionId, RunConfig};

#[derive(Parser, Debug)]
#[command(
    name = "scantron",
    version,
    about = "Mark an answer key on a blank scan-sheet image"
)]
struct Cli {
    /// Log level for stderr output (off, error, warn, info, debug, trace).
    /// With the `tracing` feature, `RUST_LOG` overrides it when set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    /// Emit JSON log lines (only with the `tracing` feature).
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw markers for an answer key and write the annotated image.
    Mark(MarkArgs),
    /// Look up the coordinate of one question/answer pair.
    Resolve(ResolveArgs),
}

#[derive(Args, Debug)]
struct MarkArgs {
    /// JSON run config; the flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Coordinate dataset (.csv or .json) with Question, Answer, X, Y.
    #[arg(long)]
    coords: Option<String>,
    /// Blank reference form image.
    #[arg(long)]
    image: Option<String>,
    /// Answer-key dataset (.csv or .json) with Question, Answer.
    #[arg(long)]
    answers: Option<String>,
    /// Annotated image path [default: Colored_Scantron.jpg].
    #[arg(short, long)]
    output: Option<String>,
    /// Output encoding (jpeg or png) [default: from the output extension].
    #[arg(long)]
    format: Option<ExportFormat>,
    /// JPEG quality, 1-100.
    #[arg(long)]
    quality: Option<u8>,
    /// JSON marker style file.
    #[arg(long)]
    style: Option<PathBuf>,
    #[arg(long)]
    radius: Option<f32>,
    #[arg(long)]
    opacity: Option<f32>,
    #[arg(long)]
    border_width: Option<f32>,
    /// Fill color (name or #rrggbb).
    #[arg(long)]
    fill: Option<Color>,
    /// Border color (name or #rrggbb).
    #[arg(long)]
    border: Option<Color>,
    /// Write a JSON report of all outcomes.
    #[arg(long)]
    report: Option<String>,
    /// Print the answer key as a reference table.
    #[arg(long)]
    show_key: bool,
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// Coordinate dataset (.csv or .json).
    #[arg(long)]
    coords: PathBuf,
    /// Question id; integers are looked up as numeric ids.
    #[arg(long)]
    question: String,
    #[arg(long)]
    answer: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.log_level, cli.json_logs) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Command::Mark(args) => mark(args),
        Command::Resolve(args) => resolve(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: LevelFilter, _json: bool) -> Result<(), Box<dyn std::error::Error>> {
    scantron::core::init_with_level(level)?;
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging(level: LevelFilter, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    scantron::core::init_tracing(level, json);
    Ok(())
}

fn mark(args: MarkArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = build_config(&args)?;
    let summary = scantron::run(&cfg)?;

    if args.show_key {
        println!("{}", summary.answer_key.reference_table());
    }
    for line in summary.report.log_lines() {
        println!("{line}");
    }
    println!(
        "marked {} of {} answers, wrote {}",
        summary.report.marked,
        summary.report.outcomes.len(),
        summary.report.output_path
    );
    Ok(())
}

fn build_config(args: &MarkArgs) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let mut cfg = match &args.config {
        Some(path) => RunConfig::load_json(path)?,
        None => {
            let (Some(coords), Some(image), Some(answers)) =
                (&args.coords, &args.image, &args.answers)
            else {
                return Err("--coords, --image and --answers are required without --config".into());
            };
            RunConfig::new(coords, image, answers)
        }
    };

    if let Some(coords) = &args.coords {
        cfg.coords_path = coords.clone();
    }
    if let Some(image) = &args.image {
        cfg.image_path = image.clone();
    }
    if let Some(answers) = &args.answers {
        cfg.answers_path = answers.clone();
    }
    if let Some(output) = &args.output {
        cfg.output_path = Some(output.clone());
    }
    if let Some(format) = args.format {
        cfg.format = Some(format);
    }
    if let Some(quality) = args.quality {
        cfg.quality = quality;
    }
    if let Some(report) = &args.report {
        cfg.report_path = Some(report.clone());
    }

    if let Some(path) = &args.style {
        let raw = std::fs::read_to_string(path)?;
        cfg.style = serde_json::from_str::<MarkStyle>(&raw)?;
    }
    if let Some(radius) = args.radius {
        cfg.style.radius = radius;
    }
    if let Some(opacity) = args.opacity {
        cfg.style.opacity = opacity;
    }
    if let Some(width) = args.border_width {
        cfg.style.border_width = width;
    }
    if let Some(fill) = args.fill {
        cfg.style.fill = Some(fill);
    }
    if let Some(border) = args.border {
        cfg.style.border = Some(border);
    }

    Ok(cfg)
}

fn resolve(args: ResolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let index = dataset::load_coordinate_index(&args.coords)?;
    let entry = AnswerKeyEntry {
        question_id: QuestionId::from_cell(&args.question),
        answer_label: args.answer,
    };
    for outcome in resolve_outcomes(std::slice::from_ref(&entry), &index) {
        println!("{outcome}");
    }
    Ok(())
}
