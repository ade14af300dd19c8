pub mod engine;
pub mod events;
pub mod impact;
pub mod loan;
