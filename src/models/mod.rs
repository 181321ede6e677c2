pub mod category;
pub mod event;
pub mod order;
pub mod ticket;
pub mod user;
