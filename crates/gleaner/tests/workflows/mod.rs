use super::*;

mod aggregation;
mod search;
