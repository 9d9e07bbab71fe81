//! Business logic services.

pub mod account;
pub mod email;
pub mod notice;
pub mod notification;
pub mod publisher;
pub mod token;

pub use account::{AccountService, AccountSummary, AuthSession, LoginInput, RegisterInput};
pub use email::{EmailMessage, Mailer, MailerService, NoOpMailer, SmtpMailer};
pub use notice::{CreateNoticeInput, NoticeService, Page, Pagination, UpdateNoticeInput};
pub use notification::{FanoutReport, NotificationFanout};
pub use publisher::{NoticePublisher, Publication, SweepReport};
pub use token::{Claims, TokenService};
