pub mod client;
pub mod error;
pub mod framing;
pub mod protocol;
pub mod requests;
pub mod testing;
pub mod traits;

pub use client::CppToolsClient;
pub use error::LspError;
pub use traits::LanguageClient;
