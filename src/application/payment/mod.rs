mod errors;
mod payment_service;

pub use errors::{PaymentApplicationError, Result};
pub use payment_service::{
    PaymentCancellation, PaymentDetails, PaymentReceipt, cancel_payment, confirm_payment,
    get_payment, list_payments, prepare_payment,
};
