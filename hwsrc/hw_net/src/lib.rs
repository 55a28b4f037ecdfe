#[macro_use] extern crate serde_derive;

pub mod multipart;
pub mod native_http;
pub mod transport;
