//! Configuration module

mod site;

pub use site::IndexNowConfig;
pub use site::PublisherConfig;
