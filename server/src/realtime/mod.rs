pub mod dispatcher;
pub mod registry;

pub use dispatcher::NotificationDispatcher;
pub use registry::ConnectionRegistry;
