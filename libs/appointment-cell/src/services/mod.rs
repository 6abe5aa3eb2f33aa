pub mod admin;
pub mod booking;
pub mod export;
pub mod lifecycle;
pub mod notification;
pub mod store;
pub mod validation;

pub use admin::AdminService;
pub use booking::BookingService;
pub use store::SupabaseBookingStore;
