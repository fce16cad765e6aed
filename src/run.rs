//! The single linear pass: fetch feed, then for each entry decide whether an
//! artifact already exists and generate one if not.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::feed::{FeedClient, FeedEntry};
use crate::images::{self, ImageBackend};
use crate::{prompt, slug};

/// Counts for the end-of-run summary line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub generated: usize,
    pub skipped: usize,
}

/// One full run: ensure the output directory, fetch the feed, process every
/// entry in feed order.
pub async fn run(config: &Config, backend: &dyn ImageBackend) -> Result<RunSummary> {
    std::fs::create_dir_all(&config.images.dir).with_context(|| {
        format!(
            "failed to create images directory {}",
            config.images.dir.display()
        )
    })?;

    println!("Fetching feed from: {}", config.feed.url);
    let entries = FeedClient::new(&config.feed.url).fetch_entries().await?;

    if entries.is_empty() {
        println!("No entries found in feed.");
        return Ok(RunSummary::default());
    }

    process_entries(&entries, backend, &config.images.dir).await
}

/// Process entries sequentially. The existence check is the only cache: a
/// file at `<dir>/<slug>.png` is taken as proof of a prior successful run.
///
/// One entry's failure aborts the rest of the run. Nothing was written for
/// the failed entry, so it (and everything after it) is retried on the next
/// invocation.
pub async fn process_entries(
    entries: &[FeedEntry],
    backend: &dyn ImageBackend,
    images_dir: &Path,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for entry in entries {
        let slug = slug::slugify(&entry.title);
        let output_path = images_dir.join(format!("{slug}.png"));

        if output_path.exists() {
            println!(
                "Image already exists for '{}' -> {}, skipping.",
                entry.title,
                output_path.display()
            );
            summary.skipped += 1;
            continue;
        }

        if let Some(published) = entry.published {
            tracing::debug!(title = %entry.title, published = %published.to_rfc3339(), "new entry");
        }

        let prompt = prompt::build_prompt(&entry.title, entry.summary.as_deref());
        println!("Generating image for: {prompt}");

        images::fetch_and_save(backend, &prompt, &output_path)
            .await
            .with_context(|| format!("failed to generate image for '{}'", entry.title))?;

        println!("Saved image to {}", output_path.display());
        summary.generated += 1;
    }

    Ok(summary)
}
