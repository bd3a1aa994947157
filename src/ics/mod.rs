//! iCalendar text decoding.
//!
//! - `envelope`: locate the `VCALENDAR` block in a body
//! - `tokenizer`: unfold lines and group them into event blocks
//! - `date`: decode compact date and date-time tokens

pub mod date;
pub mod envelope;
pub mod tokenizer;

pub use date::{DateError, IcsDate, check_in_date, check_out_date};
pub use envelope::{contains_calendar, extract_calendar, strip_bom};
pub use tokenizer::tokenize;
