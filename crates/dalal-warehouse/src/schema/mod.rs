pub mod common;
pub mod common_de;
pub mod crypto;
pub mod news;
pub mod stock;

pub use common::{rank, Direction, Mover, Movers, MOVERS_LIMIT};
