//! Daily refresh timer. A single polling loop rather than a precise alarm:
//! every tick it asks "has the configured time of day passed on a calendar
//! day I have not fired on yet?". A process that slept through the alarm
//! simply fires on its next poll; missed ticks never accumulate a backlog.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike};
use musebox_core::config::RefreshConfig;
use musebox_core::refresh::Refresher;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub struct Schedule {
    at: NaiveTime,
}

impl Schedule {
    /// Parse an "HH:MM" time of day.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let at = NaiveTime::parse_from_str(s, "%H:%M")
            .map_err(|e| anyhow::anyhow!("invalid refresh time '{}': {}", s, e))?;
        Ok(Self { at })
    }

    pub fn is_due(&self, now: DateTime<Local>, last_fired: Option<NaiveDate>) -> bool {
        if last_fired == Some(now.date_naive()) {
            return false;
        }
        now.time() >= self.at
    }

    pub fn hour(&self) -> u32 {
        self.at.hour()
    }
}

/// Spawn the daily refresh loop. `last_fired` carries the date of the
/// startup refresh so the loop does not immediately fire a second time.
pub fn spawn(
    refresher: Arc<Refresher>,
    config: RefreshConfig,
    mut last_fired: Option<NaiveDate>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let schedule = match Schedule::parse(&config.at) {
            Ok(s) => s,
            Err(e) => {
                error!("[scheduler] {e:#}, daily refresh disabled");
                return;
            }
        };
        let poll = Duration::from_secs(config.poll_interval_secs.max(1));
        info!(
            "[scheduler] daily refresh at {} (polling every {:?})",
            config.at, poll
        );

        loop {
            tokio::time::sleep(poll).await;

            let now = Local::now();
            if !schedule.is_due(now, last_fired) {
                continue;
            }

            info!("[scheduler] firing daily refresh");
            match refresher.run_once().await {
                Ok(_) => last_fired = Some(now.date_naive()),
                Err(e) => {
                    // Retry on the next poll rather than marking the day done.
                    warn!("[scheduler] refresh failed: {e}");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Schedule::parse("2am").is_err());
        assert!(Schedule::parse("").is_err());
        assert_eq!(Schedule::parse("02:00").unwrap().hour(), 2);
    }

    #[test]
    fn test_not_due_before_time() {
        let s = Schedule::parse("02:00").unwrap();
        assert!(!s.is_due(local(2025, 6, 1, 1, 59), None));
    }

    #[test]
    fn test_due_at_and_after_time() {
        let s = Schedule::parse("02:00").unwrap();
        assert!(s.is_due(local(2025, 6, 1, 2, 0), None));
        // Late poll (process was asleep) still fires.
        assert!(s.is_due(local(2025, 6, 1, 17, 30), None));
    }

    #[test]
    fn test_fires_once_per_day() {
        let s = Schedule::parse("02:00").unwrap();
        let fired = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(!s.is_due(local(2025, 6, 1, 3, 0), Some(fired)));
        // Next day it is due again.
        assert!(s.is_due(local(2025, 6, 2, 2, 0), Some(fired)));
    }
}
