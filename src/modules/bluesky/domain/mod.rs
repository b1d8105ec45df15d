pub mod entities;
pub mod ports;

pub use entities::{
    starter_pack_uri, Did, MemberReference, Profile, StarterPackRecord, STARTER_PACK_COLLECTION,
};
pub use ports::{AtprotoApi, ListPage, RecordView};
