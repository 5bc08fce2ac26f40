//! Input limits and content checks shared by the parsers.

pub mod validation;
