pub mod config;
pub mod feed;
pub mod images;
pub mod prompt;
pub mod run;
pub mod slug;
