pub mod coordinate;
pub mod metadata;
pub mod requests;

// Re-export commonly used types
pub use coordinate::{DecimalCoordinate, DmsCoordinate, Hemisphere, NamedLocation, Rational};
pub use metadata::{MetadataRecord, MetadataValue, TextFields};
pub use requests::{
    EditOutcome, GpsSummary, LineWarning, LocationBatchResponse, MetadataEdits, PhotoSummary,
    UploadQuery,
};
