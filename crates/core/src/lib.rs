//! Core business logic for noticeboard.
//!
//! - [`NoticeService`]: notice CRUD and manual publishing
//! - [`NoticePublisher`]: the scheduled publication sweep
//! - [`NotificationFanout`]: emails students about newly published notices
//! - [`AccountService`] and [`TokenService`]: registration, login and bearer tokens

pub mod services;
pub mod test_utils;

pub use services::*;
