use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::record::Records;
use crate::error::AppResult;

#[async_trait]
pub trait TimeClockService: Send + Sync {
    /// Download the check-in/check-out records of an inclusive date window.
    /// With `include_last` the most recent, possibly still open, clocking is
    /// fetched too.
    async fn records(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        include_last: bool,
    ) -> AppResult<Records>;
}
