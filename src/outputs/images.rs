//! Thumbnail downloads for classified rows.
//!
//! Images are saved as `img-<feed position>` plus the extension from the URL
//! path, if it has one. The position is the record's place in the collected
//! feed, so numbers skip over cards the classifier dropped. A row whose image cannot be fetched keeps an empty
//! `image_reference`; one failed download never fails the run.

use crate::models::ClassifiedRow;
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// File name for the image of the record at feed position `idx`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(image_filename(3, "https://example.com/a/photo.JPG?w=300"), "img-3.jpg");
/// assert_eq!(image_filename(0, "https://example.com/render"), "img-0");
/// ```
pub fn image_filename(idx: usize, url: &str) -> String {
    let extension = Url::parse(url).ok().and_then(|parsed| {
        let last = parsed.path_segments()?.next_back()?.to_string();
        let (_, ext) = last.rsplit_once('.')?;
        let valid = !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then(|| ext.to_ascii_lowercase())
    });
    match extension {
        Some(ext) => format!("img-{idx}.{ext}"),
        None => format!("img-{idx}"),
    }
}

/// Download every row's image into `image_dir`, at most `concurrency` at a time.
///
/// Returns new rows, in the same order, whose `image_reference` is the saved
/// path, or empty when there was no image or the download failed.
#[instrument(level = "info", skip_all, fields(rows = rows.len(), %image_dir))]
pub async fn download_images(
    client: &reqwest::Client,
    rows: &[ClassifiedRow],
    image_dir: &str,
    concurrency: usize,
) -> Result<Vec<ClassifiedRow>, Box<dyn Error>> {
    fs::create_dir_all(image_dir).await?;

    let stored: Vec<ClassifiedRow> = stream::iter(rows)
        .map(|row| async move {
            let url = row.image_reference.as_str();
            if url.is_empty() {
                return row.with_image_reference("");
            }
            let idx = row.source_index;
            let path = image_path(image_dir, row);
            match download_image(client, url, &path).await {
                Ok(()) => {
                    debug!(index = idx, path = %path.display(), "Saved image");
                    row.with_image_reference(path.to_string_lossy())
                }
                Err(e) => {
                    warn!(index = idx, %url, error = %e, "Image download failed");
                    row.with_image_reference("")
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let saved = stored.iter().filter(|r| !r.image_reference.is_empty()).count();
    info!(saved, total = stored.len(), "Finished image downloads");
    Ok(stored)
}

/// Where the image of `row` is stored under `image_dir`.
pub fn image_path(image_dir: &str, row: &ClassifiedRow) -> PathBuf {
    Path::new(image_dir).join(image_filename(row.source_index, &row.image_reference))
}

async fn download_image(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    fs::write(path, &bytes).await?;
    Ok(())
}
