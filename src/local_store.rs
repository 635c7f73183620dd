use crate::{
    backend::{
        booking_cancelled, booking_not_found, display_name_or_default, member_not_found,
        slot_not_found, BookingBackend, POINT_HISTORY_LIMIT, REGISTRATION_BONUS_DESCRIPTION,
        REGISTRATION_BONUS_POINTS,
    },
    error::Error,
    identity::Profile,
    slot_template::default_slots,
    types::{
        Booking, BookingChange, BookingStatus, Member, MemberUpdate, NewTimeSlot, PointEntry,
        TimeSlot,
    },
};
use chrono::{NaiveDate, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    slots: Vec<TimeSlot>,
    bookings: Vec<Booking>,
    members: Vec<Member>,
    point_history: Vec<PointEntry>,
    last_member_number: u64,
}

impl State {
    fn insert_slots(&mut self, slots: &[NewTimeSlot]) {
        for slot in slots {
            let exists = self
                .slots
                .iter()
                .any(|existing| existing.date == slot.date && existing.time == slot.time);
            if !exists {
                self.slots.push(slot.clone().into());
            }
        }
    }

    fn ensure_default_slots(&mut self, date: NaiveDate) {
        if !self.slots.iter().any(|slot| slot.date == date) {
            self.insert_slots(&default_slots(date));
        }
    }

    fn slot_index(&self, date: NaiveDate, time_slot: &str) -> Result<usize, Error> {
        self.slots
            .iter()
            .position(|slot| slot.date == date && slot.time == time_slot)
            .ok_or_else(|| slot_not_found(date, time_slot))
    }

    fn owned_booking_index(&self, user_id: Uuid, booking_id: Uuid) -> Result<usize, Error> {
        self.bookings
            .iter()
            .position(|booking| booking.id == booking_id && booking.user_id == user_id)
            .ok_or_else(booking_not_found)
    }

    fn acquire_seat(&mut self, index: usize) -> Result<(), Error> {
        let slot = &mut self.slots[index];
        if !slot.available() {
            return Err(Error::CapacityExceeded);
        }
        slot.booked += 1;
        Ok(())
    }

    fn release_seat(&mut self, slot_id: Uuid) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.id == slot_id) {
            slot.booked = (slot.booked - 1).max(0);
        }
    }
}

/// Non-persistent backend. Each operation runs under one lock, so every
/// operation is atomic with respect to all others.
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    state: Arc<Mutex<State>>,
}

impl LocalStore {
    fn state(&self) -> Result<MutexGuard<'_, State>, Error> {
        self.state.lock().map_err(|_| {
            error!("Local store lock poisoned");
            Error::Infrastructure("Local store lock poisoned".into())
        })
    }
}

impl BookingBackend for LocalStore {
    fn find_slots(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, Error> {
        let mut slots: Vec<TimeSlot> = self
            .state()?
            .slots
            .iter()
            .filter(|slot| slot.date == date)
            .cloned()
            .collect();
        slots.sort_by(|a, b| a.time.cmp(&b.time));
        Ok(slots)
    }

    fn insert_slots(&self, slots: &[NewTimeSlot]) -> Result<(), Error> {
        self.state()?.insert_slots(slots);
        Ok(())
    }

    fn bookings_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, Error> {
        let mut bookings: Vec<Booking> = self
            .state()?
            .bookings
            .iter()
            .filter(|booking| booking.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order among equal dates.
        bookings.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(bookings)
    }

    fn create_booking(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        time_slot: &str,
    ) -> Result<Booking, Error> {
        let mut guard = self.state()?;
        let state = &mut *guard;

        state.ensure_default_slots(date);
        let index = state.slot_index(date, time_slot)?;
        state.acquire_seat(index)?;

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id,
            slot_id: state.slots[index].id,
            date,
            time_slot: time_slot.to_string(),
            status: BookingStatus::Active,
            created_at: now,
            updated_at: now,
        };
        state.bookings.push(booking.clone());
        Ok(booking)
    }

    fn update_booking(
        &self,
        user_id: Uuid,
        booking_id: Uuid,
        change: BookingChange,
    ) -> Result<Booking, Error> {
        let mut guard = self.state()?;
        let state = &mut *guard;

        let booking_index = state.owned_booking_index(user_id, booking_id)?;
        let current = state.bookings[booking_index].clone();
        if !current.is_active() {
            return Err(booking_cancelled());
        }

        let (date, time_slot) = change.target(&current);
        if date == current.date && time_slot == current.time_slot {
            return Ok(current);
        }

        state.ensure_default_slots(date);
        let slot_index = state.slot_index(date, &time_slot)?;
        state.acquire_seat(slot_index)?;
        state.release_seat(current.slot_id);

        let slot_id = state.slots[slot_index].id;
        let booking = &mut state.bookings[booking_index];
        booking.slot_id = slot_id;
        booking.date = date;
        booking.time_slot = time_slot;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    fn cancel_booking(&self, user_id: Uuid, booking_id: Uuid) -> Result<Booking, Error> {
        let mut guard = self.state()?;
        let state = &mut *guard;

        let index = state.owned_booking_index(user_id, booking_id)?;
        if !state.bookings[index].is_active() {
            return Ok(state.bookings[index].clone());
        }

        let slot_id = state.bookings[index].slot_id;
        state.release_seat(slot_id);

        let booking = &mut state.bookings[index];
        booking.status = BookingStatus::Cancelled;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    fn find_member(&self, line_user_id: &str) -> Result<Option<Member>, Error> {
        Ok(self
            .state()?
            .members
            .iter()
            .find(|member| member.line_user_id == line_user_id)
            .cloned())
    }

    fn register_member(&self, profile: &Profile) -> Result<Member, Error> {
        let mut guard = self.state()?;
        let state = &mut *guard;

        if let Some(member) = state
            .members
            .iter()
            .find(|member| member.line_user_id == profile.user_id)
        {
            return Ok(member.clone());
        }

        state.last_member_number += 1;
        let now = Utc::now();
        let member = Member {
            id: Uuid::new_v4(),
            line_user_id: profile.user_id.clone(),
            display_name: display_name_or_default(profile),
            picture_url: profile.picture_url.clone(),
            member_number: format!("{:010}", state.last_member_number),
            points: REGISTRATION_BONUS_POINTS,
            area: None,
            courses: Vec::new(),
            created_at: now,
        };
        state.point_history.push(PointEntry {
            id: Uuid::new_v4(),
            member_id: member.id,
            amount: REGISTRATION_BONUS_POINTS,
            kind: "bonus".into(),
            description: REGISTRATION_BONUS_DESCRIPTION.into(),
            created_at: now,
        });
        state.members.push(member.clone());
        info!(member_number = %member.member_number, "Registered new member");
        Ok(member)
    }

    fn update_member(&self, line_user_id: &str, update: MemberUpdate) -> Result<Member, Error> {
        let mut state = self.state()?;
        let member = state
            .members
            .iter_mut()
            .find(|member| member.line_user_id == line_user_id)
            .ok_or_else(member_not_found)?;

        if let Some(display_name) = update.display_name {
            member.display_name = display_name;
        }
        if let Some(picture_url) = update.picture_url {
            member.picture_url = Some(picture_url);
        }
        if let Some(area) = update.area {
            member.area = Some(area);
        }
        if let Some(courses) = update.courses {
            member.courses = courses;
        }
        Ok(member.clone())
    }

    fn point_history(&self, member_id: Uuid) -> Result<Vec<PointEntry>, Error> {
        Ok(self
            .state()?
            .point_history
            .iter()
            .rev()
            .filter(|entry| entry.member_id == member_id)
            .take(POINT_HISTORY_LIMIT as usize)
            .cloned()
            .collect())
    }
}
