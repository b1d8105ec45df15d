use std::sync::Arc;

use tokio::time::sleep;

use super::retry_policy::RetryPolicy;
use crate::modules::bluesky::domain::{AtprotoApi, Did};
use crate::shared::utils::logger::PipelineLog;

/// Domain appended to bare handles
pub const DEFAULT_DOMAIN_SUFFIX: &str = ".bsky.social";

/// Normalize a human-entered handle.
///
/// Strips the default domain suffix, `http(s)://` prefixes, a leading `@` and a
/// trailing period, lower-cases, and appends the default domain when no `.` is
/// left.
pub fn normalize_handle(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut handle = lowered.as_str();

    handle = handle.strip_suffix(DEFAULT_DOMAIN_SUFFIX).unwrap_or(handle);
    for prefix in ["https://", "http://"] {
        handle = handle.strip_prefix(prefix).unwrap_or(handle);
    }
    handle = handle.strip_prefix('@').unwrap_or(handle);
    handle = handle.strip_suffix('.').unwrap_or(handle);

    if handle.contains('.') {
        handle.to_string()
    } else {
        format!("{}{}", handle, DEFAULT_DOMAIN_SUFFIX)
    }
}

/// Resolves creator handles to DIDs with bounded, linearly backed-off retries
pub struct HandleResolver {
    api: Arc<dyn AtprotoApi>,
    policy: RetryPolicy,
    log: Arc<dyn PipelineLog>,
}

impl HandleResolver {
    pub fn new(api: Arc<dyn AtprotoApi>, policy: RetryPolicy, log: Arc<dyn PipelineLog>) -> Self {
        Self { api, policy, log }
    }

    /// Returns `None` once every attempt has failed; callers skip the unit of work.
    pub async fn resolve(&self, raw_handle: &str) -> Option<Did> {
        let handle = normalize_handle(raw_handle);
        if handle.starts_with('.') {
            self.log
                .warn(&format!("Handle '{}' is empty after normalization", raw_handle));
            return None;
        }

        let attempts = self.policy.attempts();
        for attempt in 1..=attempts {
            self.log.debug(&format!(
                "Resolving handle {} (attempt {}/{})",
                handle, attempt, attempts
            ));

            match self.api.resolve_handle(&handle).await {
                Ok(did) => return Some(did),
                Err(e) => {
                    self.log
                        .warn(&format!("Error resolving handle {}: {}", raw_handle, e));

                    if attempt < attempts {
                        let delay = self.policy.delay_after(attempt);
                        self.log.info(&format!(
                            "Retrying handle resolution for {} ({}/{}) in {:?}",
                            raw_handle,
                            attempt + 1,
                            attempts,
                            delay
                        ));
                        sleep(delay).await;
                    }
                }
            }
        }

        self.log.error(&format!(
            "Failed to resolve handle {} after {} attempts",
            raw_handle, attempts
        ));
        None
    }
}
