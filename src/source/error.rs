use thiserror::Error;

use crate::broker::BrokerError;
use crate::schema::EntityType;

/// Failures talking to a record source. Recoverable: a failed fetch leaves
/// the list window untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("Source unavailable for '{entity}': {reason}")]
    Unavailable { entity: EntityType, reason: String },

    #[error("Entity '{entity}' is not served by this source")]
    UnknownEntity { entity: EntityType },

    #[error("Record {id} of '{entity}' not found")]
    RecordNotFound { entity: EntityType, id: u64 },

    #[error("No record ids left for '{entity}'")]
    IdsExhausted { entity: EntityType },

    #[error("Change notification failed: {0}")]
    Broker(#[from] BrokerError),
}
