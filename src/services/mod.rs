pub mod calendar;
pub mod file_transfer;
pub mod forge;
pub mod issue_tracker;
pub mod mailer;
pub mod time_clock;
pub mod wiki;

pub use calendar::{CalendarService, EventRequest};
pub use file_transfer::FileTransferService;
pub use forge::{ForgeDocument, ForgeFile, ForgeService, ForgeTask, ForgeTaskRequest};
pub use issue_tracker::{CreatedTicket, IssueTrackerService, TicketRef, TicketRequest, WikiPageLink};
pub use mailer::{EmailMessage, MailerService};
pub use time_clock::TimeClockService;
pub use wiki::WikiService;
