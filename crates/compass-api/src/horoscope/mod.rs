//! AI career report ("horoscope"): trigger, background generation, polling.

pub mod client;
pub mod routes;
pub mod service;

pub use routes::routes;
