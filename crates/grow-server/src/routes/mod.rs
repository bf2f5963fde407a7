pub mod accounts;
pub mod admin;
pub mod assessments;
pub mod cart;
pub mod catalog;
pub mod community;
pub mod leads;
pub mod responses;
pub mod site;
