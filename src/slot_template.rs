use crate::types::NewTimeSlot;
use chrono::NaiveDate;
use uuid::Uuid;

pub const DEFAULT_TIMES: [&str; 8] = [
    "09:00", "10:00", "11:00", "13:00", "14:00", "15:00", "16:00", "17:00",
];
pub const DEFAULT_CAPACITY: i32 = 3;

pub fn default_slots(date: NaiveDate) -> Vec<NewTimeSlot> {
    DEFAULT_TIMES
        .iter()
        .map(|time| NewTimeSlot {
            id: Uuid::new_v4(),
            date,
            time: (*time).to_string(),
            capacity: DEFAULT_CAPACITY,
            booked: 0,
        })
        .collect()
}
