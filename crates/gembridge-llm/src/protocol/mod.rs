//! Provider wire format types

pub mod google;
