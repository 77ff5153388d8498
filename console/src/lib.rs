pub mod autocomplete;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod form;
pub mod query;
pub mod reconciler;

#[cfg(test)]
mod testing;
