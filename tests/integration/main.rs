//! Integration tests: the extraction engine end-to-end with a scripted
//! lookup provider, and the HTTP surface over it.

mod helpers;

mod api_test;
mod engine_test;
