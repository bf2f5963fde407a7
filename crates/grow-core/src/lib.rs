pub mod accounts;
pub mod bank;
pub mod catalog;
pub mod community;
pub mod config;
pub mod error;
pub mod forms;
pub mod insights;
pub mod io;
pub mod leads;
pub mod paths;
pub mod response;
pub mod scoring;
pub mod types;
pub mod wizard;

pub use error::{FieldError, GrowError, Result};
