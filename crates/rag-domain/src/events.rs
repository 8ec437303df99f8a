//! Domain events raised by pipeline stages, consumed by
//! [`crate::ports::events::EventSubscriber`]s registered at boot.

use chrono::{DateTime, Utc};

use crate::value_objects::{DocumentState, JobState, Lane};

/// A typed event crossing the `EventPublisher` boundary. Stages raise
/// these instead of calling subscribers directly (§9: replaces the
/// Python `send_event` callback chains).
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A document's lifecycle state changed.
    DocumentStateChanged {
        document_id: String,
        state: DocumentState,
        progress: u8,
        at: DateTime<Utc>,
    },
    /// C3 classified a document into a lane.
    DocumentClassified { document_id: String, lane: Lane },
    /// A document reached a terminal state.
    DocumentFinished {
        document_id: String,
        state: DocumentState,
    },
    /// An embedding job's state changed.
    JobStateChanged {
        job_id: String,
        document_id: String,
        state: JobState,
    },
    /// The secrets sweep ran, dropping `removed` orphaned parcels.
    SecretsSwept { removed: u64, at: DateTime<Utc> },
}
