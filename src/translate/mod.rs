pub mod client;
pub mod decode;
pub mod detect;
pub mod interface;
pub mod payload;

pub use client::DeepLClient;
pub use interface::{TranslateRequest, TranslatorInterface};
