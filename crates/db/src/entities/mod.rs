//! Database entities.

pub mod account;
pub mod notice;

pub use account::Entity as Account;
pub use notice::Entity as Notice;
