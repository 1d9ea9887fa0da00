// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar dates.

use chrono::{Datelike, Local, NaiveDate};

/// Today's calendar date in the server's local time zone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Age in whole years on `today` (last-birthday age, never rounded).
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Parse a "YYYY-MM-DD" date, as used for journal keys.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
