//! Pet Store Store: the order placement workflow and inventory
//! reporting, composed over the pet and order repositories.

pub mod service;

pub use service::{Inventory, OrderRequest, StoreService};
