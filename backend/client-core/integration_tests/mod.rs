mod client_tests;
mod error;
