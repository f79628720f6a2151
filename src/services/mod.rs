pub mod catalog;
pub mod matching;
pub mod pagination;
pub mod scoring;
pub mod search;
pub mod trending;
