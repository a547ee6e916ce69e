use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancels `cancelation` once the user interrupts the process. This is the teardown event after
/// which the timer saves itself one last time. Returns early if something else cancels first.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                info!("Interrupted, shutting down");
                cancelation.cancel();
            }
            Err(e) => {
                error!("Can't listen for interruption {e:?}");
                cancelation.cancelled().await;
            }
        },
        _ = cancelation.cancelled() => (),
    };
}
