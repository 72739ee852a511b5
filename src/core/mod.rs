pub mod errors;
pub mod models;

pub use errors::JournalError;
pub use models::{ Entry, FieldValue, COIN_SYMBOL_KEY, TRADE_RESULT_KEY };
