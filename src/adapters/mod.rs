pub mod mock;
pub mod postgres;
pub mod stripe_checkout;
pub mod telegram;

pub use stripe_checkout::StripeCheckoutProvider;
pub use telegram::TelegramNotificationService;
