pub mod broker;
pub mod local;

pub use broker::FileBroker;
