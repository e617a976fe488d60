pub mod catalog;
pub mod events;
pub mod http_client;
pub mod setlists;
