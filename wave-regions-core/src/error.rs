use crate::region::RegionId;

#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    /// Region creation was requested before the host player reported ready.
    #[error("host player is not ready; regions cannot be created yet")]
    HostNotReady,

    #[error("no region with id {0}")]
    UnknownRegion(RegionId),

    #[error("invalid regions config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// Drag-to-create needs a measurable container.
    #[error("timeline container has no width")]
    InvalidContainer,
}
