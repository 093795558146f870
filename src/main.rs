// CLI entry point for the thumbnail optimizer.
// The lib.rs file serves as the public API for external consumers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use thumbnail_optimizer::export;
use thumbnail_optimizer::utils::{format_bytes, format_from_extension};
use thumbnail_optimizer::{
    BatchEvent, ImageFormat, PipelineConfig, SourceImage, TaskStatus, ThumbnailOptimizer,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

impl From<FormatArg> for ImageFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Optimize images into platform-ready 16:9 thumbnails under a byte ceiling.
#[derive(Debug, Parser)]
#[command(name = "thumbnail-optimizer", version)]
struct Args {
    /// Image files to optimize (png or jpeg)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory for the optimized outputs
    #[arg(short, long, default_value = "optimized")]
    out_dir: PathBuf,

    /// Package all completed outputs into this zip archive instead of
    /// writing loose files
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Force every download into one format (re-encodes when it differs
    /// from what the pipeline produced)
    #[arg(long)]
    format: Option<FormatArg>,

    /// Override the output ceiling in bytes
    #[arg(long)]
    max_output_bytes: Option<u64>,

    /// Override the number of concurrent workers
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_ansi(true)          // Keep colored output
        .with_writer(std::io::stdout)
        .compact();               // Use compact formatter instead of pretty

    subscriber.init();

    let args = Args::parse();

    let mut config = PipelineConfig::default();
    if let Some(ceiling) = args.max_output_bytes {
        config.output_ceiling_bytes = ceiling;
    }
    if let Some(concurrency) = args.concurrency {
        config.max_concurrency = concurrency;
    }

    let optimizer = ThumbnailOptimizer::new(config)?;

    let mut sources = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        // Unknown extensions get an opaque MIME type; validation reports
        // them per item instead of aborting the whole run.
        let mime = format_from_extension(&file_name)
            .map(|f| f.mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string());
        sources.push(SourceImage::new(file_name, mime, bytes));
    }

    info!("optimizing {} files", sources.len());
    let mut handle = optimizer.submit(sources).await?;

    while let Some(event) = handle.next_event().await {
        match event {
            BatchEvent::Truncated { skipped, accepted, .. } => {
                warn!("only {accepted} images can be processed at once, {skipped} skipped");
            }
            BatchEvent::TaskDone {
                byte_size,
                compression_ratio,
                resolution_warning,
                progress,
                ..
            } => {
                let saved = compression_ratio * 100.0;
                info!(
                    "[{}/{}] done: {} ({saved:.0}% of the upload saved){}",
                    progress.completed_tasks,
                    progress.total_tasks,
                    format_bytes(byte_size),
                    if resolution_warning { " [upscaled]" } else { "" }
                );
            }
            BatchEvent::TaskError { reason, progress, .. } => {
                warn!(
                    "[{}/{}] failed: {reason}",
                    progress.completed_tasks, progress.total_tasks
                );
            }
            _ => {}
        }
    }

    let results = handle.wait().await;
    let done = results.iter().filter(|r| r.status == TaskStatus::Done).count();
    let failed = results.len() - done;

    if results.is_empty() || done == 0 {
        warn!("nothing completed, no output written");
    } else if let Some(archive_path) = &args.archive {
        let file = std::fs::File::create(archive_path)
            .with_context(|| format!("could not create {}", archive_path.display()))?;
        let count = export::write_archive(&results, file)?;
        info!("packaged {count} images into {}", archive_path.display());
    } else {
        std::fs::create_dir_all(&args.out_dir)
            .with_context(|| format!("could not create {}", args.out_dir.display()))?;
        for item in results.iter().filter(|r| r.status == TaskStatus::Done) {
            let requested = args
                .format
                .map(ImageFormat::from)
                .or_else(|| item.encoded.as_ref().map(|e| e.format))
                .unwrap_or(ImageFormat::Png);
            let path = export::save_item(item, &args.out_dir, requested)?;
            info!("wrote {}", path.display());
        }
    }

    info!("finished: {done} optimized, {failed} failed");
    Ok(())
}
