//! Data models for feedback and its annotations.

mod feedback;
mod mode;

pub use feedback::{
    AnnotationRecord, Category, FeedbackItem, FeedbackStatus, Priority, Sentiment,
    DEFAULT_CONFIDENCE,
};
pub use mode::AnnotationMode;
