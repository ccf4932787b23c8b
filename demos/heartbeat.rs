//! # Example: heartbeat
//!
//! Polls a "heartbeat" source three times with a short exponential backoff
//! and prints every lifecycle event through [`LogWriter`].
//!
//! ## Flow
//! ```text
//! RepeatWithBackoff
//!   ├─► publish(AttemptStarting, attempt=1) → "beat #1" → publish(AttemptCompleted)
//!   ├─► publish(BackoffScheduled{delay=100ms})
//!   ├─► [timer]
//!   ├─► publish(AttemptStarting, attempt=2) → "beat #2" → publish(AttemptCompleted)
//!   ├─► publish(BackoffScheduled{delay=200ms})
//!   ├─► [timer]
//!   ├─► publish(AttemptStarting, attempt=3) → "beat #3" → publish(AttemptCompleted)
//!   └─► publish(RepeatExhausted)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example heartbeat --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backoff_repeat::{
    BackoffPolicy, BackoffRepeater, Bus, LogWriter, SourceFn, Subscribe, SubscriberSet,
};
use futures::{StreamExt, stream};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Event plumbing: bus → subscriber set → LogWriter
    let bus = Bus::default();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let set = Arc::new(SubscriberSet::new(subs, bus.clone()));
    let token = CancellationToken::new();
    let listener = Arc::clone(&set).listen(token.clone());

    // 2. A source that yields one beat per attempt
    let beats = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&beats);
    let heartbeat = SourceFn::new("heartbeat", move || {
        let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
        stream::iter([Ok::<_, std::io::Error>(format!("beat #{n}"))])
    });

    // 3. Three attempts: 100ms, then 200ms apart
    let repeater = BackoffRepeater::builder(heartbeat)
        .with_repeat_count(3)
        .with_strategy(BackoffPolicy {
            first: Duration::from_millis(50),
            max: Duration::from_secs(1),
            factor: 2.0,
        })
        .with_bus(bus.clone())
        .build()?;

    let mut beats_stream = repeater.open();
    while let Some(beat) = beats_stream.next().await {
        println!("{}", beat?);
    }

    // 4. Let the log worker flush, then stop
    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();
    listener.await?;
    Ok(())
}
