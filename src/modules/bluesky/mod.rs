pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{HandleResolver, ProfileFetcher, RecordClient, RetryPolicy};
pub use domain::{AtprotoApi, Did, MemberReference, Profile, StarterPackRecord};
pub use infrastructure::{BlueskyClient, ClientConfig};
