pub mod book;
pub mod borrowing;
pub mod notifications;
pub mod payment;
pub mod user;

mod dependencies;

pub use dependencies::{ServiceDependencies, ServiceSettings};
