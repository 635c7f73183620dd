use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    backend::BookingBackend,
    error::Error,
    identity::{IdentityVerifier, Profile},
    types::{Booking, BookingChange, Member, MemberUpdate, NewTimeSlot, PointEntry, TimeSlot},
};

pub struct MockBookingBackendInner {
    pub success: AtomicBool,
    pub calls_to_provision_slots: AtomicU64,
    pub calls_to_find_slots: AtomicU64,
    pub calls_to_insert_slots: AtomicU64,
    pub calls_to_bookings_for_user: AtomicU64,
    pub calls_to_create_booking: AtomicU64,
    pub calls_to_update_booking: AtomicU64,
    pub calls_to_cancel_booking: AtomicU64,
    pub calls_to_find_member: AtomicU64,
    pub calls_to_register_member: AtomicU64,
    pub calls_to_update_member: AtomicU64,
    pub calls_to_point_history: AtomicU64,
}

/// Backend that records calls and fails with an infrastructure error while
/// `success` is false. Every lookup comes back empty.
#[derive(Clone)]
pub struct MockBookingBackend(pub Arc<MockBookingBackendInner>);

impl MockBookingBackendInner {
    fn new() -> Self {
        Self {
            success: AtomicBool::new(true),
            calls_to_provision_slots: AtomicU64::default(),
            calls_to_find_slots: AtomicU64::default(),
            calls_to_insert_slots: AtomicU64::default(),
            calls_to_bookings_for_user: AtomicU64::default(),
            calls_to_create_booking: AtomicU64::default(),
            calls_to_update_booking: AtomicU64::default(),
            calls_to_cancel_booking: AtomicU64::default(),
            calls_to_find_member: AtomicU64::default(),
            calls_to_register_member: AtomicU64::default(),
            calls_to_update_member: AtomicU64::default(),
            calls_to_point_history: AtomicU64::default(),
        }
    }
}

impl MockBookingBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockBookingBackendInner::new()))
    }

    pub fn total_calls(&self) -> u64 {
        [
            &self.0.calls_to_provision_slots,
            &self.0.calls_to_find_slots,
            &self.0.calls_to_insert_slots,
            &self.0.calls_to_bookings_for_user,
            &self.0.calls_to_create_booking,
            &self.0.calls_to_update_booking,
            &self.0.calls_to_cancel_booking,
            &self.0.calls_to_find_member,
            &self.0.calls_to_register_member,
            &self.0.calls_to_update_member,
            &self.0.calls_to_point_history,
        ]
        .iter()
        .map(|counter| counter.load(Ordering::SeqCst))
        .sum()
    }

    fn record<R>(&self, counter: &AtomicU64, value: R) -> Result<R, Error> {
        counter.fetch_add(1, Ordering::SeqCst);
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(value),
            false => Err(Error::Infrastructure("Supposed to fail".into())),
        }
    }
}

impl BookingBackend for MockBookingBackend {
    fn find_slots(&self, _date: NaiveDate) -> Result<Vec<TimeSlot>, Error> {
        self.record(&self.0.calls_to_find_slots, Vec::new())
    }

    fn insert_slots(&self, _slots: &[NewTimeSlot]) -> Result<(), Error> {
        self.record(&self.0.calls_to_insert_slots, ())
    }

    fn provision_slots(&self, _date: NaiveDate) -> Result<Vec<TimeSlot>, Error> {
        self.record(&self.0.calls_to_provision_slots, Vec::new())
    }

    fn bookings_for_user(&self, _user_id: Uuid) -> Result<Vec<Booking>, Error> {
        self.record(&self.0.calls_to_bookings_for_user, Vec::new())
    }

    fn create_booking(
        &self,
        _user_id: Uuid,
        date: NaiveDate,
        time_slot: &str,
    ) -> Result<Booking, Error> {
        self.record(&self.0.calls_to_create_booking, ())?;
        Err(crate::backend::slot_not_found(date, time_slot))
    }

    fn update_booking(
        &self,
        _user_id: Uuid,
        _booking_id: Uuid,
        _change: BookingChange,
    ) -> Result<Booking, Error> {
        self.record(&self.0.calls_to_update_booking, ())?;
        Err(crate::backend::booking_not_found())
    }

    fn cancel_booking(&self, _user_id: Uuid, _booking_id: Uuid) -> Result<Booking, Error> {
        self.record(&self.0.calls_to_cancel_booking, ())?;
        Err(crate::backend::booking_not_found())
    }

    fn find_member(&self, _line_user_id: &str) -> Result<Option<Member>, Error> {
        self.record(&self.0.calls_to_find_member, None)
    }

    fn register_member(&self, _profile: &Profile) -> Result<Member, Error> {
        self.record(&self.0.calls_to_register_member, ())?;
        Err(crate::backend::member_not_found())
    }

    fn update_member(&self, _line_user_id: &str, _update: MemberUpdate) -> Result<Member, Error> {
        self.record(&self.0.calls_to_update_member, ())?;
        Err(crate::backend::member_not_found())
    }

    fn point_history(&self, _member_id: Uuid) -> Result<Vec<PointEntry>, Error> {
        self.record(&self.0.calls_to_point_history, Vec::new())
    }
}

/// Accepts a fixed set of bearer tokens, each mapped to one LINE user.
pub struct StaticIdentityVerifier {
    profiles: HashMap<String, Profile>,
}

impl StaticIdentityVerifier {
    pub fn new(tokens: &[(&str, &str)]) -> Self {
        let profiles = tokens
            .iter()
            .map(|(token, user_id)| {
                let profile = Profile {
                    user_id: user_id.to_string(),
                    display_name: format!("Display {user_id}"),
                    picture_url: None,
                };
                (token.to_string(), profile)
            })
            .collect();
        Self { profiles }
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, bearer: Option<&str>) -> Result<Profile, Error> {
        bearer
            .and_then(|token| self.profiles.get(token))
            .cloned()
            .ok_or(Error::Unauthorized)
    }
}
