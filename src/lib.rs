pub mod config;
pub mod fetch;
pub mod s3;
pub mod source;
pub mod utils;
