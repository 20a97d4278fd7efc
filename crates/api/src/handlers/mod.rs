pub mod auth;
pub mod bookings;
pub mod contacts;
pub mod google;
pub mod payments;
pub mod safety;
pub mod trips;
