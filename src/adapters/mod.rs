// Adapters layer: concrete implementations of the domain ports (remote services, storage).

pub mod openai;
pub mod serpapi;
pub mod storage;

pub use openai::OpenAiTranslator;
pub use serpapi::SerpApiClient;
pub use storage::LocalStorage;
