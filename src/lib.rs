pub mod cancel;
pub mod client;
pub mod protocol;
pub mod server;
pub mod session;
pub mod sse;
pub mod tools;
pub mod transcript;
pub mod ui;
