pub mod bills;
pub mod certificate;
pub mod clockings;
pub mod cryptogram;
pub mod holidays;
pub mod lifelong;
pub mod paycheck;
pub mod reports;
pub mod timetracker;
pub mod upload;
