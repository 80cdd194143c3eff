pub mod badgebox;
pub mod caldav;
pub mod confluence;
pub mod ftp;
pub mod jira;
pub mod phabricator;
pub mod smtp;
