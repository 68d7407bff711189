//! Subcommand bodies. Each one wires the infra adapters into core and prints a result.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use chromadesk_core::ports::{BackgroundApplier, Clock, MetadataFetcher};
use chromadesk_core::{ImageStore, RunOutcome, UpdatePipeline};
use chromadesk_infra::bing::BingFetcher;
use chromadesk_infra::clock::SystemClock;
use chromadesk_infra::config::{ConfigFile, Settings};
use chromadesk_infra::http::HttpTransport;
use chromadesk_infra::wallpaper::DesktopApplier;

fn store(settings: &Settings) -> anyhow::Result<ImageStore<HttpTransport>> {
    let dir = settings.wallpaper_dir()?;
    let transport = HttpTransport::new().context("build http client")?;
    Ok(ImageStore::new(dir, transport))
}

pub fn update(config: &ConfigFile, settings: &Settings) -> anyhow::Result<()> {
    let pipeline = UpdatePipeline::new(
        BingFetcher::new()?,
        store(settings)?,
        DesktopApplier::new(settings.desktop),
        config,
        SystemClock,
    )
    .with_notifications(settings.notify);

    match pipeline.run()? {
        RunOutcome::Disabled => {
            println!("Daily updates are disabled (set settings.enabled = true)");
        }
        RunOutcome::AlreadyCurrent { date } => {
            println!("Already updated on {date}");
        }
        RunOutcome::Updated(report) => {
            println!("{}", report.path.display());
            println!("{} ({})", report.title, report.image_date);
            if report.pruned > 0 {
                println!("Removed {} old wallpaper(s)", report.pruned);
            }
        }
    }
    Ok(())
}

pub fn set(settings: &Settings, image: PathBuf) -> anyhow::Result<()> {
    let image = if image.is_absolute() {
        image
    } else {
        std::env::current_dir()
            .context("get current dir")?
            .join(image)
    };
    DesktopApplier::new(settings.desktop)
        .apply(&image)
        .with_context(|| format!("set wallpaper {}", image.display()))?;
    println!("{}", image.display());
    Ok(())
}

pub fn set_url(settings: &Settings, url: &str) -> anyhow::Result<()> {
    let store = store(settings)?;
    store.ensure_directory()?;
    let stored = store
        .materialize_url(url, SystemClock.today())
        .with_context(|| format!("download {url}"))?;
    DesktopApplier::new(settings.desktop)
        .apply(&stored.path)
        .with_context(|| format!("set wallpaper {}", stored.path.display()))?;
    println!("{}", stored.path.display());
    Ok(())
}

pub fn fetch(settings: &Settings, region: Option<String>) -> anyhow::Result<()> {
    let region = region.unwrap_or_else(|| settings.region.clone());
    let info = BingFetcher::new()?
        .fetch(&region)
        .with_context(|| format!("fetch featured image for {region}"))?;
    info!(date = %info.date, title = info.display_title(), "Fetched featured image info");

    let store = store(settings)?;
    store.ensure_directory()?;
    let stored = store.materialize(&info).context("download featured image")?;
    store.prune(settings.keep_history)?;

    println!("{}", stored.path.display());
    Ok(())
}

pub fn history(settings: &Settings) -> anyhow::Result<()> {
    let dir = settings.wallpaper_dir()?;
    let store = ImageStore::new(dir, ());
    for path in store.history(settings.keep_history)? {
        println!("{}", path.display());
    }
    Ok(())
}

pub fn config_show(settings: &Settings) -> anyhow::Result<()> {
    print!("{}", settings.to_toml_string()?);
    Ok(())
}

pub fn config_init(config: &ConfigFile) -> anyhow::Result<()> {
    if config.init()? {
        println!("Wrote {}", config.path().display());
    } else {
        println!("{} is up to date", config.path().display());
    }
    Ok(())
}

pub fn config_set(config: &ConfigFile, section: &str, key: &str, value: &str) -> anyhow::Result<()> {
    config.set(section, key, value)?;
    println!("{section}.{key} = {value}");
    Ok(())
}
