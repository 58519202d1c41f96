mod reconfig;

pub use reconfig::*;
