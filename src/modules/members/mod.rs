pub mod domain;
pub mod infrastructure;

pub use domain::{MemberEntry, MemberRepository, Membership, PackSummary, PackUser};
pub use infrastructure::SqliteMemberRepository;
