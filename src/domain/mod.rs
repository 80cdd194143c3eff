pub mod public_holidays;
pub mod record;
pub mod worklog;
