pub mod deposit;
pub mod withdrawal;
