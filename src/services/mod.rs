//! External collaborators: the rate provider and the mail relay.

pub mod coinmarketcap;
pub mod mailer;
pub mod market_data;

pub use coinmarketcap::CmcRateSource;
pub use mailer::{DispatchOutcome, Dispatcher, Mailer, SmtpMailer};
pub use market_data::{QuoteRequest, RateSource};
