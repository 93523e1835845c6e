pub mod book;
pub mod borrowing;
pub mod commands;
pub mod errors;
pub mod events;
pub mod fee;
pub mod payment;
pub mod user;
pub mod value_objects;

pub use book::*;
pub use borrowing::*;
pub use errors::*;
pub use events::*;
pub use fee::*;
pub use payment::*;
pub use user::*;
pub use value_objects::*;
