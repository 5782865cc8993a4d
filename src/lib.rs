// trustcheck: misinformation screening for Facebook posts
//
// This is the library root. Each module corresponds to one stage of the
// screening pipeline or the surface that triggers it.

pub mod config;
pub mod facebook;
pub mod inference;
pub mod output;
pub mod pipeline;
pub mod status;
pub mod web;
