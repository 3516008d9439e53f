pub mod account;
pub mod completions;
pub mod get;
pub mod submit;
