//! Conversion from canonical requests to the Gemini wire format
//!
//! Responses flow the other way through [`crate::stream::ResponseTranslator`].

pub mod google;

pub use google::build_request;
