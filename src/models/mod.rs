pub mod appointment;
pub mod check_in;
pub mod enums;
pub mod medication;
pub mod recipient;

pub use appointment::*;
pub use check_in::*;
pub use medication::*;
pub use recipient::*;
