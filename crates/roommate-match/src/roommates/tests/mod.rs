mod analytics;
mod common;
mod service;
