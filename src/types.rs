use crate::delivery_areas::{delivery_day_for_area, DeliveryDay};
use crate::schema::{members, point_history, time_slots};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = time_slots)]
#[diesel(check_for_backend(Pg))]
pub struct TimeSlot {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub capacity: i32,
    pub booked: i32,
}

impl TimeSlot {
    pub fn available(&self) -> bool {
        self.booked < self.capacity
    }

    pub fn remaining_seats(&self) -> i32 {
        (self.capacity - self.booked).max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = time_slots)]
pub struct NewTimeSlot {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub capacity: i32,
    pub booked: i32,
}

impl From<NewTimeSlot> for TimeSlot {
    fn from(slot: NewTimeSlot) -> Self {
        Self {
            id: slot.id,
            date: slot.date,
            time: slot.time,
            capacity: slot.capacity,
            booked: slot.booked,
        }
    }
}

/// Client facing view of a slot. `date` serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub available: bool,
    pub remaining_seats: i32,
}

impl From<&TimeSlot> for SlotView {
    fn from(slot: &TimeSlot) -> Self {
        Self {
            id: slot.id,
            date: slot.date,
            time: slot.time.clone(),
            available: slot.available(),
            remaining_seats: slot.remaining_seats(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Active,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "ACTIVE",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ACTIVE" => Ok(BookingStatus::Active),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(format!("Unknown booking status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slot_id: Uuid,
    pub date: NaiveDate,
    pub time_slot: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }
}

/// Requested move of a booking. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingChange {
    pub date: Option<NaiveDate>,
    pub time_slot: Option<String>,
}

impl BookingChange {
    /// Resolves the target (date, time) against the booking's current one.
    pub fn target(&self, booking: &Booking) -> (NaiveDate, String) {
        (
            self.date.unwrap_or(booking.date),
            self.time_slot
                .clone()
                .unwrap_or_else(|| booking.time_slot.clone()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = members)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub line_user_id: String,
    pub display_name: String,
    pub picture_url: Option<String>,
    pub member_number: String,
    pub points: i32,
    pub area: Option<String>,
    pub courses: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = members)]
pub struct MemberUpdate {
    pub display_name: Option<String>,
    pub picture_url: Option<String>,
    pub area: Option<String>,
    pub courses: Option<Vec<String>>,
}

impl MemberUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.picture_url.is_none()
            && self.area.is_none()
            && self.courses.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRank {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl MemberRank {
    pub fn from_points(points: i32) -> Self {
        match points {
            p if p >= 10_000 => MemberRank::Platinum,
            p if p >= 5_000 => MemberRank::Gold,
            p if p >= 1_000 => MemberRank::Silver,
            _ => MemberRank::Bronze,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    #[serde(flatten)]
    pub member: Member,
    pub rank: MemberRank,
    pub delivery_day: Option<DeliveryDay>,
}

impl From<Member> for MemberView {
    fn from(member: Member) -> Self {
        let rank = MemberRank::from_points(member.points);
        let delivery_day = member.area.as_deref().and_then(delivery_day_for_area);
        Self {
            member,
            rank,
            delivery_day,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = point_history)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct PointEntry {
    pub id: Uuid,
    pub member_id: Uuid,
    pub amount: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
