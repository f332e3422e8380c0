pub mod booking;
pub mod movie;
pub mod show;
pub mod user;

pub use booking::{Booking, BookingDetails, BookingStatus};
pub use movie::Movie;
pub use show::{Show, ShowWithSeats};
pub use user::User;
