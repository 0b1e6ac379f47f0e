pub mod records;

pub use records::{
    parse_timestamp, NewSubmission, NewVisit, ServiceTag, SubmissionRecord, VisitRecord,
};
