pub mod cli;
pub mod mac;
pub mod netdev;
pub mod prelude;
pub mod reconfig;
