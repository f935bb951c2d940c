//! Trait seams: storage, the LLM port, and the post-commit listener.

pub mod listener;
pub mod store;
pub mod summarizer;

pub use listener::{CompletionNotice, FailureNotice, LifecycleListener, NoopListener};
pub use store::{
    IntakeStore, OutboxLog, ProcessedEventStore, ProcessingStore, SnapshotFingerprint,
    SnapshotStore,
};
pub use summarizer::Summarizer;
