//! article-parser CLI - layout reconstruction for scanned article PDFs

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use article_parser::engine::{
    CommandBridge, CommandDetector, CommandTableExtractor, PdfRasterizer, TesseractOcr,
};
use article_parser::{
    ArticleParser, ArtifactStore, Engines, JsonFormat, NormalizeOptions, PageSelection,
    PageSource, PageStatus,
};

#[derive(Parser)]
#[command(name = "article-parser")]
#[command(author = "article-parser contributors")]
#[command(version)]
#[command(
    about = "Extract ordered text, figures and tables from scanned article PDFs",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a PDF into document.json plus figure and table artifacts
    Parse {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory (defaults to <FILE stem>_parsed)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Layout model command; receives a page PNG path as its last argument
        #[arg(long, value_name = "CMD", env = "ARTICLE_PARSER_DETECTOR")]
        detector_cmd: String,

        /// Table extraction command; receives a table crop PNG path
        #[arg(long, value_name = "CMD", env = "ARTICLE_PARSER_TABLES")]
        table_cmd: Option<String>,

        /// Tesseract language
        #[arg(long, default_value = "eng")]
        lang: String,

        /// Rasterization scale (2.0 = 144 dpi)
        #[arg(long, default_value = "2.0")]
        scale: f32,

        /// Worker threads (0 = one per CPU)
        #[arg(short, long, default_value = "0")]
        workers: usize,

        /// Process pages one at a time
        #[arg(long)]
        sequential: bool,

        /// Stop at the first failed page
        #[arg(long)]
        strict: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Per-page time limit in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Drop detections scoring below this value
        #[arg(long, default_value = "0.0")]
        min_score: f32,

        /// Apply Unicode, ligature and whitespace cleanup to OCR text
        #[arg(long)]
        clean: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Parse {
            input,
            output,
            detector_cmd,
            table_cmd,
            lang,
            scale,
            workers,
            sequential,
            strict,
            pages,
            timeout,
            min_score,
            clean,
            compact,
        }) => {
            let args = ParseArgs {
                output,
                detector_cmd,
                table_cmd,
                lang,
                scale,
                workers,
                sequential,
                strict,
                pages,
                timeout,
                min_score,
                clean,
                compact,
            };
            cmd_parse(&input, args)
        }
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: article-parser parse <FILE> --detector-cmd <CMD>".yellow());
            println!("Run with --help for more information.");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

struct ParseArgs {
    output: Option<PathBuf>,
    detector_cmd: String,
    table_cmd: Option<String>,
    lang: String,
    scale: f32,
    workers: usize,
    sequential: bool,
    strict: bool,
    pages: Option<String>,
    timeout: Option<u64>,
    min_score: f32,
    clean: bool,
    compact: bool,
}

fn cmd_parse(input: &Path, args: ParseArgs) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = args.output.unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        input.with_file_name(format!("{}_parsed", stem))
    });
    log::debug!("Writing artifacts to {}", output_dir.display());

    let detector =
        CommandDetector::new(CommandBridge::parse(&args.detector_cmd)?).with_min_score(args.min_score);
    let ocr = TesseractOcr::new().with_lang(args.lang);
    let tables = args
        .table_cmd
        .as_deref()
        .map(CommandBridge::parse)
        .transpose()?
        .map(CommandTableExtractor::new);

    let mut engines = Engines::new(&detector, &ocr);
    if let Some(tables) = &tables {
        engines = engines.with_tables(tables);
    }

    let mut parser = ArticleParser::new()
        .with_scale(args.scale)
        .with_workers(args.workers);
    if args.sequential {
        parser = parser.sequential();
    }
    if args.strict {
        parser = parser.strict();
    }
    if let Some(p) = &args.pages {
        let selection = PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?;
        parser = parser.with_pages(selection);
    }
    if let Some(secs) = args.timeout {
        parser = parser.with_page_timeout(Duration::from_secs(secs));
    }
    if args.clean {
        parser = parser.with_normalize(NormalizeOptions::full());
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Parsing {}", input.display()));

    let assembly = parser.parse_with_progress(input, &engines, |progress| {
        pb.set_length(progress.total as u64);
        pb.set_position(progress.done as u64);
        if progress.status == PageStatus::Failed {
            pb.println(format!(
                "{} page {}",
                "Failed".red(),
                progress.page + 1
            ));
        }
    })?;
    pb.set_message("Writing artifacts...");

    let format = if args.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json_path = ArtifactStore::new(&output_dir)
        .with_format(format)
        .persist(&assembly.document)?;

    pb.finish_with_message("Done!");

    let document = &assembly.document;
    println!("\n{}", "Output files:".green().bold());
    println!("  {} {}", "├─".dimmed(), json_path.display());
    println!("  {} {} text blocks", "├─".dimmed(), document.text.len());
    println!("  {} {} figures", "├─".dimmed(), document.figures.len());
    println!("  {} {} tables", "└─".dimmed(), document.tables.len());

    if assembly.cancelled {
        println!("\n{}", "Run was cancelled before all pages finished".yellow());
    }
    if !assembly.failures.is_empty() {
        println!(
            "\n{} {} page(s) failed:",
            "Warning:".yellow().bold(),
            assembly.failures.len()
        );
        for failure in &assembly.failures {
            println!("  {} {}", "•".dimmed(), failure);
        }
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = PdfRasterizer::open(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), source.format());
    println!("{}: {}", "Pages".bold(), source.page_count());

    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "article-parser".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Layout reconstruction and caption association for article PDFs");
    println!();
    println!("License: MIT");
}
