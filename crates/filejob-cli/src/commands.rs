//! Command implementations

use anyhow::{bail, Context, Result};
use console::style;
use filejob_core::{
    CompressImageOptions, CompressPdfOptions, ConvertImageOptions, DirectorySink,
    ExtractPdfOptions, FilejobConfig, HttpJobService, JobController, JobKind, JobOptions,
    JobService, JobSnapshot, JobStatus, Preset, SelectedFile, TargetFormat, PRESETS,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

use crate::{Cli, Command};

pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Command::Presets => {
            print_presets();
            Ok(())
        }
        Command::Formats { ref file } => print_formats(file),
        Command::Health => health(&config).await,
        Command::CompressImage {
            ref file,
            quality,
            no_preserve_format,
            target_kb,
        } => {
            let options = JobOptions::CompressImage(CompressImageOptions {
                quality,
                preserve_format: !no_preserve_format,
                target_size_kb: target_kb,
            });
            run_job(&cli, &config, JobKind::CompressImage, vec![file.clone()], JobSetup::Ready(options)).await
        }
        Command::ConvertImage { ref file, to } => {
            let options = JobOptions::ConvertImage(ConvertImageOptions { target_format: to });
            run_job(&cli, &config, JobKind::ConvertImage, vec![file.clone()], JobSetup::Ready(options)).await
        }
        Command::ResizeImage {
            ref file,
            width,
            height,
            ref preset,
            no_lock,
        } => {
            let setup = JobSetup::Resize {
                width,
                height,
                preset: preset.clone(),
                lock: !no_lock,
            };
            run_job(&cli, &config, JobKind::ResizeImage, vec![file.clone()], setup).await
        }
        Command::CompressPdf { ref file, level } => {
            let options = JobOptions::CompressPdf(CompressPdfOptions {
                compression_level: level,
            });
            run_job(&cli, &config, JobKind::CompressPdf, vec![file.clone()], JobSetup::Ready(options)).await
        }
        Command::ExtractPdf { ref file, start, end } => {
            let options = JobOptions::ExtractPdf(ExtractPdfOptions {
                start_page: start,
                end_page: end.unwrap_or(start),
            });
            run_job(&cli, &config, JobKind::ExtractPdf, vec![file.clone()], JobSetup::Ready(options)).await
        }
        Command::MergePdf { ref files } => {
            run_job(&cli, &config, JobKind::MergePdf, files.clone(), JobSetup::Ready(JobOptions::MergePdf)).await
        }
    }
}

fn load_config(cli: &Cli) -> Result<FilejobConfig> {
    let config = match &cli.config {
        Some(path) => FilejobConfig::from_file(path)?,
        None => FilejobConfig::default(),
    };
    let mut config = config.with_env_overrides()?;

    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(dir) = &cli.out {
        config.output.download_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Options known up front, or resize fields resolved against the image
enum JobSetup {
    Ready(JobOptions),
    Resize {
        width: Option<u32>,
        height: Option<u32>,
        preset: Option<String>,
        lock: bool,
    },
}

fn resolve_options(controller: &mut JobController, setup: JobSetup) -> Result<JobOptions> {
    let (width, height, preset, lock) = match setup {
        JobSetup::Ready(options) => return Ok(options),
        JobSetup::Resize {
            width,
            height,
            preset,
            lock,
        } => (width, height, preset, lock),
    };

    let solver = controller
        .dimensions_mut()
        .context("Could not read image dimensions.")?;
    solver.set_lock(lock);
    if let Some(name) = preset {
        let preset = Preset::find(&name)
            .with_context(|| format!("unknown preset '{}', see `filejob presets`", name))?;
        solver.apply(preset);
    }
    match (width, height) {
        (Some(w), Some(h)) => solver.apply_preset(w, h),
        (Some(w), None) => solver.set_width(w),
        (None, Some(h)) => solver.set_height(h),
        (None, None) => {}
    }
    Ok(JobOptions::ResizeImage(controller.resize_options()?))
}

async fn read_files(paths: &[PathBuf]) -> Result<Vec<SelectedFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = SelectedFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(file);
    }
    Ok(files)
}

async fn run_job(
    cli: &Cli,
    config: &FilejobConfig,
    kind: JobKind,
    paths: Vec<PathBuf>,
    setup: JobSetup,
) -> Result<()> {
    let service = Arc::new(HttpJobService::new(&config.api)?);
    let sink = Arc::new(DirectorySink::new(&config.output.download_dir));
    let mut controller = JobController::new(kind, service, sink, config);

    let files = read_files(&paths).await?;
    controller.select(files)?;
    let options = resolve_options(&mut controller, setup)?;

    let started = controller.run_selected(options).await?;
    tracing::info!(
        "Tracking {} job {}",
        kind,
        started.id.as_ref().map(|id| id.as_str()).unwrap_or("?")
    );

    let bar = progress_bar(kind, cli.json)?;
    let outcome = tokio::select! {
        finished = track(controller.subscribe(), &bar) => Some(finished?),
        _ = tokio::signal::ctrl_c() => None,
    };

    let Some(snapshot) = outcome else {
        controller.reset();
        bar.abandon_with_message("cancelled");
        eprintln!("{}", style("Cancelled").yellow());
        std::process::exit(130);
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    match snapshot.status {
        JobStatus::Completed if cli.no_download => {
            if !cli.json {
                println!(
                    "{} result available at {}",
                    style("✓").green(),
                    snapshot.result.as_ref().map(|r| r.as_str()).unwrap_or("")
                );
            }
            Ok(())
        }
        JobStatus::Completed => {
            let saved = controller.download().await?;
            if !cli.json {
                println!("{} saved {}", style("✓").green(), style(&saved).bold());
            }
            Ok(())
        }
        _ => bail!(
            "{} job failed: {}",
            kind,
            snapshot.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

fn progress_bar(kind: JobKind, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {prefix} [{bar:40.cyan/blue}] {pos:>3}% {msg}")?
            .progress_chars("=> "),
    );
    bar.set_prefix(kind.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(120));
    Ok(bar)
}

/// Follow published snapshots until the job is terminal
async fn track(
    mut updates: watch::Receiver<Option<JobSnapshot>>,
    bar: &ProgressBar,
) -> Result<JobSnapshot> {
    loop {
        let current = updates.borrow_and_update().clone();
        let Some(snapshot) = current else {
            bar.abandon();
            bail!("job was discarded");
        };

        bar.set_position(u64::from(snapshot.progress));
        bar.set_message(status_label(snapshot.status));
        if snapshot.is_terminal() {
            bar.finish_and_clear();
            return Ok(snapshot);
        }

        updates
            .changed()
            .await
            .context("controller stopped publishing updates")?;
    }
}

fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Idle => "idle",
        JobStatus::Validated => "validated",
        JobStatus::Submitting => "uploading",
        JobStatus::Polling => "processing",
        JobStatus::Completed => "done",
        JobStatus::Failed => "failed",
    }
}

fn print_presets() {
    println!("{}", style("Resize presets").bold());
    for preset in PRESETS {
        println!(
            "  {:<20} {}",
            preset.name,
            style(format!("{}x{}", preset.width, preset.height)).cyan()
        );
    }
}

fn print_formats(file: &Path) -> Result<()> {
    let source = file
        .extension()
        .and_then(|e| e.to_str())
        .and_then(TargetFormat::from_extension);
    let recommended = TargetFormat::recommended_for(source);

    println!("{}", style("Conversion targets").bold());
    for format in TargetFormat::ALL.into_iter().filter(|f| Some(*f) != source) {
        if recommended.contains(&format) {
            println!("  {:<6} {}", format, style("recommended").green());
        } else {
            println!("  {}", format);
        }
    }
    Ok(())
}

async fn health(config: &FilejobConfig) -> Result<()> {
    let service = HttpJobService::new(&config.api)?;
    if service.health_check().await? {
        println!("{} {} is reachable", style("✓").green(), config.api.base_url);
        Ok(())
    } else {
        bail!("{} is not reachable", config.api.base_url)
    }
}
