use std::time::Duration;

use tracing::debug;

const TICK: Duration = Duration::from_secs(1);

/// Sleep `total`, one second at a time, logging the countdown.
pub async fn pause(total: Duration) {
    let mut remaining = total;
    while !remaining.is_zero() {
        let step = remaining.min(TICK);
        tokio::time::sleep(step).await;
        remaining -= step;
        debug!(remaining_secs = remaining.as_secs_f32(), "pausing");
    }
}
