pub mod client;
pub mod page;

pub use client::KursClient;
