mod plugin;
mod publish;

pub use plugin::plugin;
pub use publish::publish;
