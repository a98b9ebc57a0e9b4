pub mod desktop;

pub use desktop::Notifier;
