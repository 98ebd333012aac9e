//! Runtime for driving the LR(1) parse tables generated by `canolr`.

pub mod definition;
pub mod parser;
