pub mod config;
pub mod link_collector;
pub mod review_page;
pub mod review_scraper;
pub mod types;
