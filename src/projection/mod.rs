//! Read-side projections: daily buckets, monthly folds and the views built
//! on top of them.

pub mod cache;
pub mod daily;
pub mod monthly;
pub mod views;

pub use cache::{ProjectionCache, ProjectionKey};
pub use daily::{
    build_daily_buckets, build_daily_buckets_with_horizon, BucketItem, DailyBucket,
    DailyProjection, ItemSource, ProjectionInputs, ProjectionIssue,
};
pub use monthly::{
    aggregate_by_month, aggregate_fiscal_year, aggregate_keyed_by_month, aggregate_period,
    MonthlyAggregate, PeriodTotals,
};
pub use views::{CalendarMonth, DashboardYear, MonthSummary, Projector};
