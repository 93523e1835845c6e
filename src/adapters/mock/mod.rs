pub mod checkout_provider;
pub mod notification_service;
pub mod store;

pub use checkout_provider::CheckoutProvider;
pub use notification_service::NotificationService;
pub use store::InMemoryStore;
