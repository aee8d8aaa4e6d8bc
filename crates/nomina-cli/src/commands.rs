//! Subcommand implementations

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use nomina_core::{catalog, Renderer, Report, ReportKind, Screen};
use nomina_render::{HtmlRenderer, JsonRenderer, TextRenderer};
use nomina_source::{FileSource, Freshness, Generated, HttpSource, Pipeline, SnapshotCache};
use tracing::{info, warn};

use crate::config::Config;

/// Output format of `report`
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Html,
    Json,
}

/// Where report data comes from
#[derive(Clone, Debug, Default)]
pub struct SourceOptions {
    pub url: Option<String>,
    pub input: Option<PathBuf>,
    pub refresh: bool,
}

// ============================================================================
// Loading
// ============================================================================

/// Build the pipeline and its snapshot cache. Local files get an in-memory
/// cache; the remote source keeps its snapshot on disk.
fn open(config: &Config, options: &SourceOptions) -> (Pipeline, SnapshotCache) {
    let ttl = config.source.cache_ttl();

    if let Some(path) = &options.input {
        return (Pipeline::new(FileSource::new(path)), SnapshotCache::new(ttl));
    }

    let url = options.url.as_deref().unwrap_or(&config.source.url);
    let source = HttpSource::new(url).timeout(config.source.timeout());
    let cache = SnapshotCache::load(config.source.snapshot_path(), ttl).unwrap_or_else(|e| {
        warn!(error = %e, "ignoring unreadable snapshot");
        SnapshotCache::new(ttl)
    });
    (Pipeline::new(source), cache)
}

fn generate(config: &Config, options: &SourceOptions, kinds: &[ReportKind]) -> Result<Generated> {
    let (pipeline, mut cache) = open(config, options);
    let generated = pipeline
        .generate(&mut cache, kinds, options.refresh)
        .with_context(|| format!("Failed to load {}", pipeline.source().describe()))?;

    if let Freshness::Stale { reason } = &generated.freshness {
        eprintln!(
            "warning: source unavailable ({reason}); showing data from {}",
            generated.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    Ok(generated)
}

/// Drop repeated kinds, keeping first occurrence order
fn dedup(kinds: &[ReportKind]) -> Vec<ReportKind> {
    let mut unique = Vec::with_capacity(kinds.len());
    for kind in kinds {
        if !unique.contains(kind) {
            unique.push(*kind);
        }
    }
    unique
}

fn write_output(output: Option<&Path>, content: &[u8]) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = content.len(), "wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content)
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn html_page(title: &str, generated: &Generated) -> HtmlRenderer {
    let page = HtmlRenderer::new()
        .title(title)
        .fetched_at(generated.fetched_at);
    match &generated.freshness {
        Freshness::Stale { .. } => page.notice(stale_notice(generated.fetched_at)),
        _ => page,
    }
}

fn stale_notice(at: DateTime<Utc>) -> String {
    format!(
        "La fuente de datos no está disponible. Se muestran los datos del {}.",
        at.format("%Y-%m-%d %H:%M UTC")
    )
}

// ============================================================================
// Commands
// ============================================================================

/// `nomina reports`
pub fn list() -> String {
    let mut out = String::from("Reports:\n");
    for kind in ReportKind::ALL {
        out.push_str(&format!(
            "  {:<24}{}\n",
            kind.slug(),
            catalog::definition(kind).title
        ));
    }
    out.push_str("\nScreens:\n");
    for screen in Screen::ALL {
        let kinds: Vec<&str> = screen.reports().iter().map(|k| k.slug()).collect();
        out.push_str(&format!("  {:<24}{}\n", screen.slug(), kinds.join(", ")));
    }
    out
}

/// `nomina report`
pub fn report(
    config: &Config,
    options: &SourceOptions,
    kinds: &[ReportKind],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let kinds = dedup(kinds);
    let generated = generate(config, options, &kinds)?;

    let rendered = match format {
        OutputFormat::Text => TextRenderer::new().render(&generated.reports)?,
        OutputFormat::Json => {
            let mut json = JsonRenderer.render(&generated.reports)?;
            json.push('\n');
            json
        }
        OutputFormat::Html => {
            let title = match generated.reports.as_slice() {
                [single] => single.title.clone(),
                _ => "Ejecución presupuestal".to_string(),
            };
            html_page(&title, &generated).render(&generated.reports)?
        }
    };
    write_output(output, rendered.as_bytes())
}

/// Default workbook name for an export of `kinds`
pub fn export_file_name(kinds: &[ReportKind], stamp: &str) -> String {
    match kinds {
        [single] => format!("RP_{}_{stamp}.xlsx", single.sheet_name()),
        _ => format!("RP_DOCENTES_COMPLETO_{stamp}.xlsx"),
    }
}

/// `nomina export`
pub fn export(
    config: &Config,
    options: &SourceOptions,
    kinds: &[ReportKind],
    output: Option<&Path>,
) -> Result<PathBuf> {
    let kinds = if kinds.is_empty() {
        Screen::RecursosPropios.reports().to_vec()
    } else {
        dedup(kinds)
    };
    let generated = generate(config, options, &kinds)?;

    let bytes = config
        .export
        .renderer()
        .render(&generated.reports)
        .context("Failed to build workbook")?;

    let path = output.map_or_else(
        || {
            let stamp = Local::now().format("%Y%m%d_%H%M").to_string();
            PathBuf::from(export_file_name(&kinds, &stamp))
        },
        Path::to_path_buf,
    );
    fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), sheets = sheet_count(&generated.reports), "exported workbook");
    Ok(path)
}

fn sheet_count(reports: &[Report]) -> usize {
    reports.iter().filter(|r| !r.is_empty()).count()
}

/// `nomina dashboard`
pub fn dashboard(
    config: &Config,
    options: &SourceOptions,
    screen: Screen,
    output: Option<&Path>,
) -> Result<()> {
    let generated = generate(config, options, screen.reports())?;
    let html = html_page(screen.title(), &generated).render(&generated.reports)?;
    write_output(output, html.as_bytes())
}
