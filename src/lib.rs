pub mod config;
pub mod demo;
pub mod labels;
pub mod model;
pub mod perf;
pub mod prediction;
pub mod report;
pub mod serve;
