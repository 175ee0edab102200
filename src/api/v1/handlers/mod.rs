pub mod cars;
pub mod health;
pub mod trucks;
pub mod vehicles;
