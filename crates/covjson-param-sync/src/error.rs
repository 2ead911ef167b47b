//! Errors raised while synchronizing layers.

use crate::layer::LayerId;
use thiserror::Error;

/// A reducer refused to combine two values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ReducerError {
    /// Description of the failure.
    pub message: String,
}

impl ReducerError {
    /// Create a reducer error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// ParamSync errors.
///
/// All of these indicate a misconfiguration or misuse by the caller, not bad user data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The layer is already a member of a sync record.
    #[error("layer {0} is already registered")]
    AlreadyRegistered(LayerId),

    /// The layer is not a member of any sync record.
    #[error("layer {0} is not registered")]
    NotRegistered(LayerId),

    /// The layer being added was mutably borrowed elsewhere.
    #[error("the layer being added is borrowed elsewhere")]
    NewLayerBusy,

    /// A member layer was borrowed elsewhere while ParamSync needed to update it.
    #[error("layer {0} is borrowed elsewhere")]
    LayerBusy(LayerId),

    /// A registered reducer failed.
    #[error("reducer for `{property}` failed: {source}")]
    Reducer {
        /// Property whose reducer failed.
        property: String,
        /// Reducer failure.
        #[source]
        source: ReducerError,
    },
}
