mod logger;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use logger::StatusLogger;
use photo_report::{
    BudgetStatus, CancelToken, CompressionParams, ManifestEntry, PdfRenderer, PhotosPerPage,
    RasterCodec, ReportAssembler, ReportError, ReportEvent, ReportOptions, ReportSession,
    SizeBudgetCompressor,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "photorep", about = "Photo inspection report builder", version)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a report PDF from photos
    Build {
        /// Photo files, appended after any manifest entries
        images: Vec<PathBuf>,

        /// CSV manifest (columns: file, caption)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// JSON options file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report identifier, e.g. 0042/7-123456-1
        #[arg(long)]
        report_id: Option<String>,

        /// Photos on each page
        #[arg(long, value_enum)]
        photos_per_page: Option<PerPageArg>,

        /// Byte budget per photo
        #[arg(long)]
        max_bytes: Option<usize>,

        /// Header date (dd/mm/yyyy), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Logo image drawn at the left of every header
        #[arg(long)]
        logo: Option<PathBuf>,

        /// Compress one photo at a time
        #[arg(long)]
        sequential: bool,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },

    /// Compress a single photo to a byte budget
    Compress {
        input: PathBuf,

        /// Output JPEG file
        #[arg(short, long)]
        output: PathBuf,

        /// Byte budget
        #[arg(long, default_value = "1000000")]
        max_bytes: usize,
    },

    /// Write the default options to a JSON file
    InitConfig {
        #[arg(default_value = "photorep.json")]
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PerPageArg {
    #[value(name = "1", alias = "one")]
    One,
    #[value(name = "2", alias = "two")]
    Two,
}

impl From<PerPageArg> for PhotosPerPage {
    fn from(arg: PerPageArg) -> Self {
        match arg {
            PerPageArg::One => Self::One,
            PerPageArg::Two => Self::Two,
        }
    }
}

struct BuildArgs {
    images: Vec<PathBuf>,
    manifest: Option<PathBuf>,
    output: PathBuf,
    stats_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let logger = StatusLogger::new(500, level);
    logger.clone().init()?;

    match cli.command {
        Commands::Build {
            images,
            manifest,
            output,
            config,
            report_id,
            photos_per_page,
            max_bytes,
            date,
            logo,
            sequential,
            stats_only,
        } => {
            let mut options = match &config {
                Some(path) => ReportOptions::load(path)
                    .await
                    .with_context(|| format!("loading {}", path.display()))?,
                None => ReportOptions::default(),
            };
            if let Some(id) = report_id {
                options.report_id = id;
            }
            if let Some(per_page) = photos_per_page {
                options.photos_per_page = per_page.into();
            }
            if let Some(max_bytes) = max_bytes {
                options.compression.max_bytes = max_bytes;
            }
            if date.is_some() {
                options.date = date;
            }
            if logo.is_some() {
                options.logo = logo;
            }
            if sequential {
                options.parallel = false;
            }
            options.validate()?;

            let args = BuildArgs {
                images,
                manifest,
                output,
                stats_only,
            };
            build(options, args).await?;

            let problems = logger.problems();
            if !problems.is_empty() {
                println!("{} warning(s):", problems.len());
                for entry in &problems {
                    println!("  {} {}", entry.timestamp.format("%H:%M:%S"), entry.message);
                }
            }
        }

        Commands::Compress {
            input,
            output,
            max_bytes,
        } => {
            let params = CompressionParams::with_max_bytes(max_bytes);
            params.validate()?;

            let bytes = tokio::fs::read(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;
            let compressor = SizeBudgetCompressor::new(Arc::new(RasterCodec::new()), params);
            let result = compressor.compress(Arc::new(bytes)).await?;
            tokio::fs::write(&output, &result.bytes).await?;

            println!(
                "{}x{} at quality {:.0}%, {} bytes → {}",
                result.width,
                result.height,
                result.quality * 100.0,
                result.byte_size(),
                output.display()
            );
            if result.budget_unmet() {
                println!("  still over the {} byte budget", max_bytes);
            }
        }

        Commands::InitConfig { path } => {
            ReportOptions::default().save(&path).await?;
            println!("Wrote default options → {}", path.display());
        }
    }

    Ok(())
}

async fn build(options: ReportOptions, args: BuildArgs) -> Result<()> {
    let mut entries: Vec<ManifestEntry> = match &args.manifest {
        Some(path) => photo_report::load_manifest(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => Vec::new(),
    };
    entries.extend(args.images.into_iter().map(|file| ManifestEntry {
        file,
        caption: String::new(),
    }));
    if entries.is_empty() {
        bail!("No photos given; pass image files or --manifest");
    }

    let cancel = CancelToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupted; no PDF will be written (Ctrl-C again to quit now)");
            interrupt.cancel();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    let codec = Arc::new(RasterCodec::new());
    let mut session = ReportSession::new();
    for entry in &entries {
        if cancel.is_cancelled() {
            return Err(ReportError::Cancelled.into());
        }
        match session.ingest_file(&codec, &entry.file).await {
            Ok(id) => {
                if !entry.caption.is_empty() {
                    session.set_caption(id, entry.caption.as_str())?;
                }
            }
            // A bad photo is skipped; the rest of the report still builds
            Err(ReportError::Decode(err)) => log::warn!("skipping {}", err),
            Err(ReportError::Io(err)) => {
                log::warn!("skipping {}: {}", entry.file.display(), err)
            }
            Err(err) => return Err(err.into()),
        }
    }

    let stats = photo_report::calculate_statistics(session.len(), &options)?;
    println!("Report Statistics:");
    println!("  Photos: {}", stats.photos);
    println!("  Photos per page: {}", stats.photos_per_page);
    println!("  Pages: {}", stats.pages);
    println!("  Empty slots on last page: {}", stats.empty_slots);

    if args.stats_only {
        return Ok(());
    }

    let (events_tx, mut events_rx) = tokio::sync::mpsc::unbounded_channel();
    let progress = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            match event {
                ReportEvent::CompressionStarted { total } => {
                    log::info!("compressing {} photo(s)", total)
                }
                ReportEvent::PhotoCompressed {
                    id,
                    completed,
                    total,
                    byte_size,
                    status,
                } => {
                    let note = match status {
                        BudgetStatus::Met => "",
                        BudgetStatus::BudgetUnmet => " (over budget)",
                    };
                    log::info!("[{}/{}] {} {} bytes{}", completed, total, id, byte_size, note);
                }
                ReportEvent::CacheHit { id } => log::debug!("{} reused from cache", id),
                ReportEvent::LaidOut { pages } => log::debug!("laid out {} page(s)", pages),
            }
        }
    });

    let dimensions: Vec<(u32, u32)> = session
        .items()
        .iter()
        .map(|item| (item.source.width, item.source.height))
        .collect();

    let assembler = ReportAssembler::new(codec, options)
        .with_events(events_tx)
        .with_cancel_token(cancel.clone());
    let rendered = assembler
        .render(session.items(), Arc::new(PdfRenderer::new()))
        .await;
    // Closes the event channel so the progress task finishes
    drop(assembler);
    progress.await?;

    let (document, bytes) = rendered?;
    if cancel.is_cancelled() {
        return Err(ReportError::Cancelled.into());
    }
    let path = photo_report::write_report(&document, bytes, &args.output).await?;

    let summary = photo_report::summarize_compression(&document, &dimensions);
    println!(
        "Generated {} page(s), {} photo(s), {} KiB → {}",
        document.page_count(),
        document.photo_count(),
        summary.total_bytes / 1024,
        path.display()
    );
    if summary.downscaled > 0 {
        println!("  Downscaled: {}", summary.downscaled);
    }
    if summary.budget_unmet > 0 {
        println!("  Over budget at minimum size: {}", summary.budget_unmet);
    }

    Ok(())
}
