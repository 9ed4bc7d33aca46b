pub mod arima;
pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod figure;
pub mod forecast;
pub mod indicators;
pub mod logging;
pub mod page;
pub mod series;
pub mod site;
pub mod source;
pub mod toc;
