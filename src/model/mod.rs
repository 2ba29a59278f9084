//! Types that represent the core data model, such as `Expense` and `OwedItem`.
mod amount;
mod category;
mod expense;
mod owed;
mod record;

pub use amount::{Amount, AmountError, CURRENCY};
pub use category::{Card, Category};
pub use expense::{Expense, NewExpense};
pub use owed::{NewOwedItem, OwedItem};
pub use record::{Id, Record};
