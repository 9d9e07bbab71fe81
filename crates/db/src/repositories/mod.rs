//! Repositories wrapping sea-orm queries behind domain-level contracts.

mod account;
mod notice;

pub use account::AccountRepository;
pub use notice::NoticeRepository;
