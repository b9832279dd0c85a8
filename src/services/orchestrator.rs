use std::{panic::AssertUnwindSafe, path::Path};

use futures::FutureExt;
use uuid::Uuid;

use crate::{configuration::Settings, domain::RunResult, error::ScrapeError};

use super::{write_records, BrowsingSurface, Droid, SessionController};

/// One end-to-end scrape on a fresh browser session.
pub async fn run(settings: &Settings) -> Result<RunResult, ScrapeError> {
    let droid = Droid::new(&settings.browser, settings.timeouts.poll_interval()).await?;
    run_with_surface(droid, settings).await
}

/// Runs the session on `surface` and always closes it before returning. The
/// artifact is only written when the session succeeds.
pub async fn run_with_surface<S: BrowsingSurface>(
    surface: S,
    settings: &Settings,
) -> Result<RunResult, ScrapeError> {
    let run_id = Uuid::new_v4();
    log::info!("[run {}] Starting scrape", run_id);

    let outcome = {
        let mut controller = SessionController::new(&surface, settings, run_id);
        AssertUnwindSafe(controller.run())
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(ScrapeError::Extraction(
                    "extraction panicked while reading the page".to_string(),
                ))
            })
    };

    if let Err(e) = surface.close().await {
        log::warn!("[run {}] Failed closing browser: {}", run_id, e);
    }

    let result = outcome?;
    write_records(Path::new(&settings.output.artifact_path), &result.records).await?;
    log::info!(
        "[run {}] Finished with {} connection(s)",
        run_id,
        result.record_count
    );

    Ok(result)
}
