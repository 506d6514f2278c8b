pub mod calculate;
pub mod format;
pub mod ledger;
pub mod rates;
pub mod words;
