pub mod model;

pub use model::{
    Category, Event, EventPatch, EventSummary, FeedbackEntry, FeedbackSummary, MonthGroup,
    NewEvent,
};
