pub mod purchase;
