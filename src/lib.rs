pub mod config;
pub mod error;
pub mod pipe;
pub mod translate;

pub use config::Config;
pub use error::{Result, TranslateError};
pub use translate::{DeepLClient, TranslatorInterface};
