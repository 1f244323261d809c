pub mod config;
pub mod logging;

pub mod acquire;
pub mod checksum;
pub mod http;
pub mod links;
pub mod notify;
pub mod prid;
pub mod render;
pub mod report;
pub mod retry;
pub mod run;
pub mod seen;
pub mod storage;
pub mod url_model;
