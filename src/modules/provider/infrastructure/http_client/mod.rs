pub mod guarded_client;

pub use guarded_client::GuardedClient;
