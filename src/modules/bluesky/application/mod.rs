pub mod handle_resolver;
pub mod profile_fetcher;
pub mod record_client;
pub mod retry_policy;

pub use handle_resolver::{normalize_handle, HandleResolver, DEFAULT_DOMAIN_SUFFIX};
pub use profile_fetcher::ProfileFetcher;
pub use record_client::{RecordClient, LIST_PAGE_LIMIT};
pub use retry_policy::RetryPolicy;
