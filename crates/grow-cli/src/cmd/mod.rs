pub mod assess;
pub mod catalog;
pub mod config;
pub mod init;
pub mod leads;
pub mod serve;
pub mod user;
