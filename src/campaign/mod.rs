pub mod composer;
pub mod mode;
pub mod runner;
pub mod summary;

pub use composer::{Composed, MessageComposer};
pub use mode::DeliveryMode;
pub use runner::CampaignRunner;
pub use summary::{CampaignSummary, DeliveryOutcome, FailReason, OutcomeStatus, SkipReason};
