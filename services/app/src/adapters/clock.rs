//! services/app/src/adapters/clock.rs
//!
//! The production implementation of the `Clock` port. Tests substitute a
//! manual clock so simulated latency never spends real time.

use async_trait::async_trait;
use bridge_ed_core::ports::Clock;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Wall-clock time and real delays via the tokio timer.
#[derive(Clone, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
