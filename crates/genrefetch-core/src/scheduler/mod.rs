//! Acquisition scheduler.
//!
//! Quota planning → paged search per term → bounded-concurrency fetch per
//! page → aggregation into a `RunReport`. Collections and terms run
//! sequentially; only the fetches within one page run concurrently.

mod dispatch;
mod paginate;
mod progress;
mod quota;
mod report;
mod run;
mod settings;
mod single;

pub use dispatch::{dispatch_page, PageReport};
pub use paginate::{Paginator, TermProgress};
pub use progress::ProgressEvent;
pub use quota::{plan, QuotaPlan};
pub use report::{CollectionReport, CollectionStatus, RunReport, TermEnd, TermReport};
pub use run::Acquisition;
pub use settings::AcquireSettings;
pub use single::search_and_fetch;
