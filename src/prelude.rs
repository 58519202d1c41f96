pub use anyhow::bail;

pub type Void = anyhow::Result<()>;
pub type Res<T> = anyhow::Result<T>;
