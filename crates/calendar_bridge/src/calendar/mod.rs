//! Google Calendar façade: event creation and listing on the primary calendar

pub mod client;
pub mod models;
pub mod service;

pub use client::{GoogleCalendarClient, MAX_LISTED_EVENTS, PRIMARY_CALENDAR};
pub use models::{CalendarEvent, EventDateTime, EventRequest, EventResource, EventTimeInput};
pub use service::{bearer_token, CalendarService};
