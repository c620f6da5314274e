use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Run `job` now, then once every `period`, until `cancel` fires.
///
/// Runs never overlap: a slow run delays the next one, and ticks missed meanwhile are skipped
/// rather than replayed in a burst. Cancellation also interrupts a run in flight.
pub fn spawn<F, Fut>(period: Duration, cancel: CancellationToken, mut job: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    // `interval` panics on a zero period
    let period = period.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut runs: u64 = 0;
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    runs += 1;
                    trace!("refresh #{runs}");
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = job() => {}
                    }
                }
            }
        }
        debug!("refresh stopped after {runs} run(s)");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    fn counting(counter: &Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<()> + Send + 'static {
        let counter = counter.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_then_every_period() {
        let runs = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let handle = spawn(Duration::from_secs(10), cancel.clone(), counting(&runs));

        sleep(Duration::from_secs(25)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_cancel() {
        let runs = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let handle = spawn(Duration::from_secs(10), cancel.clone(), counting(&runs));

        sleep(Duration::from_secs(5)).await;
        cancel.cancel();
        handle.await.unwrap();

        let stopped_at = runs.load(Ordering::SeqCst);
        sleep(Duration::from_secs(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), stopped_at);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_runs_never_overlap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let job = {
            let (in_flight, peak, finished) = (in_flight.clone(), peak.clone(), finished.clone());
            move || {
                let (in_flight, peak, finished) = (in_flight.clone(), peak.clone(), finished.clone());
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    sleep(Duration::from_secs(25)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    finished.fetch_add(1, Ordering::SeqCst);
                }
            }
        };
        let handle = spawn(Duration::from_secs(10), cancel.clone(), job);

        sleep(Duration::from_secs(100)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert!(finished.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_a_run_in_flight() {
        let finished = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let job = {
            let finished = finished.clone();
            move || {
                let finished = finished.clone();
                async move {
                    sleep(Duration::from_secs(3600)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                }
            }
        };
        let handle = spawn(Duration::from_secs(10), cancel.clone(), job);

        sleep(Duration::from_secs(1)).await;
        cancel.cancel();
        handle.await.unwrap();
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
