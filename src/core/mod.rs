pub mod buffer;
pub mod export;
pub mod flatten;
pub mod markets;
pub mod search;
pub mod translator;

pub use crate::domain::model::{Market, ResultSet, SearchRequest, ShoppingItem, TranslationResult};
pub use crate::domain::ports::{ShoppingSearchProvider, Storage, TranslationProvider};
pub use crate::utils::error::Result;
