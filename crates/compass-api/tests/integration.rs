#[macro_use]
mod common;

mod routing_tests;
