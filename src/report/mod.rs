//! Newsletter rendering and delivery.

pub mod email;
pub mod newsletter;

pub use email::{EmailNotifier, NotifyError};
pub use newsletter::{render, subject, NewsletterData};
