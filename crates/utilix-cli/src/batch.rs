use std::future::Future;
use std::path::Path;

use tokio_util::sync::CancellationToken;
use utilix_batch::{export_results, normalize_rows, read_rows, BatchRunner, FixedDelay};
use utilix_core::{AppConfig, LookupRequest};

/// Reads `input`, looks up every parcel, and writes the results to `output`.
///
/// Rows are looked up one at a time. Ctrl-C stops the batch after the current
/// lookup; rows not yet attempted are exported as unavailable. A second
/// Ctrl-C exits the process immediately.
///
/// When `dry_run` is `true` the normalized requests are printed and no
/// lookup is made, so the service credentials are not required.
///
/// # Errors
///
/// Returns an error if the input cannot be read, credentials are missing, the
/// client cannot be built, or the output cannot be written. Failed lookups
/// for individual rows are logged and exported, not propagated.
pub(crate) async fn run_batch(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    dry_run: bool,
) -> anyhow::Result<()> {
    let aliases = crate::resolve_aliases(config)?;
    let rows = read_rows(input)?;
    let requests = normalize_rows(&rows, &aliases, &config.default_state);

    if dry_run {
        print_dry_run(&requests, &config.default_state);
        return Ok(());
    }

    let client = crate::build_client(config)?;
    let cancel = CancellationToken::new();
    let mut runner = BatchRunner::with_pacer(
        client,
        FixedDelay::from_millis(config.inter_request_delay_ms),
        config.default_state.clone(),
    )
    .with_cancellation(cancel.clone());

    let mut progress = runner.subscribe();
    let observer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let snapshot = *progress.borrow_and_update();
            tracing::info!(done = snapshot.done, total = snapshot.total, "{snapshot}");
        }
    });
    let interrupt = tokio::spawn(async move {
        if cancel_on_interrupt(tokio::signal::ctrl_c, cancel).await {
            tracing::warn!("received second ctrl-c, exiting without export");
            std::process::exit(EXIT_INTERRUPTED);
        }
    });

    let report = runner.run(&requests).await;
    drop(runner);
    if let Err(e) = observer.await {
        tracing::warn!(error = %e, "progress observer ended abnormally");
    }

    let written = export_results(&report.results, output)?;
    if report.cancelled {
        println!("batch cancelled; remaining rows exported as unavailable");
    }
    println!(
        "processed {written} rows: {} succeeded, {} failed; results written to {}",
        report.succeeded(),
        report.failed(),
        output.display()
    );
    interrupt.abort();
    Ok(())
}

/// Exit status after a forced interrupt (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

/// Cancels the batch on the first interrupt. Returns `true` once a second
/// interrupt arrives, `false` if listening fails.
async fn cancel_on_interrupt<F, Fut>(mut interrupted: F, cancel: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = interrupted().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        return false;
    }
    tracing::warn!(
        "received ctrl-c, stopping batch after the current lookup; press again to exit"
    );
    cancel.cancel();

    match interrupted().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            false
        }
    }
}

fn print_dry_run(requests: &[LookupRequest], default_state: &str) {
    println!("dry-run: would look up {} parcels", requests.len());
    for request in requests {
        let prepared = request.prepared(default_state);
        println!(
            "  row {}: apn={} county={} state={} address={}",
            prepared.row_index,
            prepared.apn,
            prepared.county,
            prepared.state,
            prepared.street_address.as_deref().unwrap_or("-"),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn first_interrupt_cancels_and_second_requests_exit() {
        let cancel = CancellationToken::new();
        let presses = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&presses);

        let forced = cancel_on_interrupt(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                std::future::ready(Ok::<(), std::io::Error>(()))
            },
            cancel.clone(),
        )
        .await;

        assert!(forced);
        assert!(cancel.is_cancelled());
        assert_eq!(presses.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn single_interrupt_only_cancels() {
        let cancel = CancellationToken::new();
        let presses = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&presses);

        let watcher = tokio::spawn(cancel_on_interrupt(
            move || {
                let first = counter.fetch_add(1, Ordering::SeqCst) == 0;
                async move {
                    if !first {
                        std::future::pending::<()>().await;
                    }
                    Ok::<(), std::io::Error>(())
                }
            },
            cancel.clone(),
        ));

        tokio::time::timeout(Duration::from_secs(5), cancel.cancelled())
            .await
            .expect("first interrupt should cancel the batch");
        assert!(!watcher.is_finished());
        watcher.abort();
    }

    #[tokio::test]
    async fn listener_failure_leaves_batch_running() {
        let cancel = CancellationToken::new();
        let forced = cancel_on_interrupt(
            || std::future::ready(Err(std::io::Error::other("no signal support"))),
            cancel.clone(),
        )
        .await;

        assert!(!forced);
        assert!(!cancel.is_cancelled());
    }
}
