pub mod entities;
pub mod repository;

pub use entities::{pack_url, rkey_from_pack_id, MemberEntry, Membership, PackSummary, PackUser};
pub use repository::MemberRepository;
