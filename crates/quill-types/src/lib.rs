//! Types shared by every layer of the blog: the domain models handed to the
//! views and the form schemas submitted by browsers.

pub mod forms;
pub mod models;
