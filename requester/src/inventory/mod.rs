pub mod client;
pub mod io;

pub use client::{InventoryRequester, InventoryRequesterExt};
