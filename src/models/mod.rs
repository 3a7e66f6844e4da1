pub mod affiliation;
pub mod candidate;
pub mod document;
pub mod enums;

pub use affiliation::AffiliationRecord;
pub use candidate::Candidate;
pub use document::Document;
pub use enums::DocumentFormat;
