//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Lookups scoped to a user follow
//! the ownership chain up to `trip_plans.user_id` and return `None` for
//! rows the user does not own.

pub mod booking_repo;
pub mod contact_repo;
pub mod event_repo;
pub mod itinerary_repo;
pub mod payment_repo;
pub mod safety_alert_repo;
pub mod safety_session_repo;
pub mod trip_plan_repo;
pub mod user_repo;

pub use booking_repo::RideBookingRepo;
pub use contact_repo::EmergencyContactRepo;
pub use event_repo::EventRepo;
pub use itinerary_repo::ItineraryRepo;
pub use payment_repo::PaymentRepo;
pub use safety_alert_repo::SafetyAlertRepo;
pub use safety_session_repo::SafetySessionRepo;
pub use trip_plan_repo::TripPlanRepo;
pub use user_repo::UserRepo;
