use crate::error::Error;
use crate::identity::Profile;
use crate::slot_template::default_slots;
use crate::types::{Booking, BookingChange, Member, MemberUpdate, NewTimeSlot, PointEntry, TimeSlot};
use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

pub const REGISTRATION_BONUS_POINTS: i32 = 100;
pub const REGISTRATION_BONUS_DESCRIPTION: &str = "Registration bonus";
pub const POINT_HISTORY_LIMIT: i64 = 50;

/// Storage for slots, bookings and members.
///
/// Every capacity-affecting operation (`create_booking`, `update_booking`,
/// `cancel_booking`) must apply its slot counter change and its booking change
/// atomically, and must never let `booked` exceed `capacity`.
pub trait BookingBackend: Clone + Send + Sync + 'static {
    /// Slots of one day ordered by time.
    fn find_slots(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, Error>;

    /// Inserts slots, silently skipping any whose (date, time) already exists.
    fn insert_slots(&self, slots: &[NewTimeSlot]) -> Result<(), Error>;

    /// Returns the slots of `date`, creating the default template first when
    /// the day has none. Safe to call concurrently for the same day.
    fn provision_slots(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, Error> {
        let slots = self.find_slots(date)?;
        if !slots.is_empty() {
            return Ok(slots);
        }

        debug!(%date, "Provisioning default slots");
        self.insert_slots(&default_slots(date))?;
        self.find_slots(date)
    }

    /// Bookings of a user, newest date first, ties in insertion order.
    fn bookings_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, Error>;

    fn create_booking(&self, user_id: Uuid, date: NaiveDate, time_slot: &str)
        -> Result<Booking, Error>;

    fn update_booking(
        &self,
        user_id: Uuid,
        booking_id: Uuid,
        change: BookingChange,
    ) -> Result<Booking, Error>;

    /// Cancelling an already cancelled booking returns it unchanged.
    fn cancel_booking(&self, user_id: Uuid, booking_id: Uuid) -> Result<Booking, Error>;

    fn find_member(&self, line_user_id: &str) -> Result<Option<Member>, Error>;

    /// Returns the member of `profile`, registering it (with the registration
    /// bonus) on first use.
    fn register_member(&self, profile: &Profile) -> Result<Member, Error>;

    fn update_member(&self, line_user_id: &str, update: MemberUpdate) -> Result<Member, Error>;

    fn point_history(&self, member_id: Uuid) -> Result<Vec<PointEntry>, Error>;
}

pub fn booking_not_found() -> Error {
    Error::NotFound("Booking not found".into())
}

pub fn slot_not_found(date: NaiveDate, time_slot: &str) -> Error {
    Error::NotFound(format!("No time slot {time_slot} on {date}"))
}

pub fn member_not_found() -> Error {
    Error::NotFound("User not found".into())
}

pub fn booking_cancelled() -> Error {
    Error::Conflict("Booking is cancelled".into())
}

pub fn display_name_or_default(profile: &Profile) -> String {
    match profile.display_name.trim() {
        "" => "User".to_string(),
        name => name.to_string(),
    }
}
