pub mod book;
pub mod clock;
pub mod services;
pub mod utils;
pub mod wizard;

pub use book::ExpenseBook;
pub use clock::{Clock, FixedClock, SystemClock};
pub use wizard::{SaveError, Step, ValidationError, Wizard};
