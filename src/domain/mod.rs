// Domain layer - Snapshots, factory geometry and display records
pub mod dashboard;
pub mod layout;
pub mod marker;
pub mod robot;
pub mod station;
pub mod stock;
pub mod transform;

mod lenient;
