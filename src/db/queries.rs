use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;

use crate::models::{
    Artifact, Booking, BookingStatus, Inquiry, InquiryStatus, LogbookEntry, SlotDay, StatusChange,
    TimeSlot,
};

// ── Slot Days ──

pub fn list_slot_days(conn: &Connection) -> anyhow::Result<Vec<SlotDay>> {
    let mut stmt = conn.prepare("SELECT date FROM slot_days ORDER BY date ASC")?;
    let dates = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut days = Vec::with_capacity(dates.len());
    for date in dates {
        let time_slots = get_time_slots(conn, &date)?;
        days.push(SlotDay { date, time_slots });
    }
    Ok(days)
}

pub fn find_slot_day(conn: &Connection, date: &str) -> anyhow::Result<Option<SlotDay>> {
    let found: Option<String> = conn
        .query_row(
            "SELECT date FROM slot_days WHERE date = ?1",
            params![date],
            |row| row.get(0),
        )
        .optional()?;

    match found {
        Some(date) => {
            let time_slots = get_time_slots(conn, &date)?;
            Ok(Some(SlotDay { date, time_slots }))
        }
        None => Ok(None),
    }
}

fn get_time_slots(conn: &Connection, date: &str) -> anyhow::Result<Vec<TimeSlot>> {
    let mut stmt = conn.prepare(
        "SELECT time, is_available, max_capacity, current_bookings
         FROM time_slots WHERE date = ?1 ORDER BY position ASC",
    )?;
    let slots = stmt
        .query_map(params![date], |row| {
            Ok(TimeSlot {
                time: row.get(0)?,
                is_available: row.get(1)?,
                max_capacity: row.get(2)?,
                current_bookings: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(slots)
}

/// Creates or replaces a day's slots, keeping their order.
pub fn upsert_slot_day(conn: &Connection, day: &SlotDay) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT OR IGNORE INTO slot_days (date) VALUES (?1)",
        params![day.date],
    )?;
    tx.execute("DELETE FROM time_slots WHERE date = ?1", params![day.date])?;
    for (position, slot) in day.time_slots.iter().enumerate() {
        tx.execute(
            "INSERT INTO time_slots (date, time, position, is_available, max_capacity, current_bookings)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                day.date,
                slot.time,
                position as i64,
                slot.is_available,
                slot.max_capacity,
                slot.current_bookings,
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

/// Compare-and-increment: bumps the counter only while the slot is open and
/// under capacity. Returns `false` when no slot qualified.
pub fn increment_booking(conn: &Connection, date: &str, time: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE time_slots SET current_bookings = current_bookings + 1
         WHERE date = ?1 AND time = ?2 AND is_available = 1 AND current_bookings < max_capacity",
        params![date, time],
    )?;
    Ok(count == 1)
}

/// Releases one booking from a slot. Never drops below zero.
pub fn decrement_booking(conn: &Connection, date: &str, time: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE time_slots SET current_bookings = current_bookings - 1
         WHERE date = ?1 AND time = ?2 AND current_bookings > 0",
        params![date, time],
    )?;
    Ok(count == 1)
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, visitor_name, email, selected_date, selected_time, status, status_history, timestamp, reference_code)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            booking.id,
            booking.visitor_name,
            booking.email,
            booking.selected_date,
            booking.selected_time,
            booking.status.as_str(),
            serde_json::to_string(&booking.status_history)?,
            format_ts(&booking.timestamp),
            booking.reference_code,
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        "SELECT id, visitor_name, email, selected_date, selected_time, status, status_history, timestamp, reference_code
         FROM bookings WHERE id = ?1",
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_bookings_for_slot(
    conn: &Connection,
    date: &str,
    time: &str,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, visitor_name, email, selected_date, selected_time, status, status_history, timestamp, reference_code
         FROM bookings WHERE selected_date = ?1 AND selected_time = ?2 ORDER BY timestamp ASC",
    )?;

    let rows = stmt.query_map(params![date, time], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn update_booking_status(conn: &Connection, booking: &Booking) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, status_history = ?2 WHERE id = ?3",
        params![
            booking.status.as_str(),
            serde_json::to_string(&booking.status_history)?,
            booking.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_booking(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let status_str: String = row.get(5)?;
    let history_json: String = row.get(6)?;
    let timestamp_str: String = row.get(7)?;

    Ok(Booking {
        id: row.get(0)?,
        visitor_name: row.get(1)?,
        email: row.get(2)?,
        selected_date: row.get(3)?,
        selected_time: row.get(4)?,
        status: BookingStatus::parse(&status_str),
        status_history: parse_history(&history_json)?,
        timestamp: parse_ts(&timestamp_str)?,
        reference_code: row.get(8)?,
    })
}

// ── Inquiries ──

pub fn create_inquiry(conn: &Connection, inquiry: &Inquiry) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO inquiries (id, full_name, email, subject, message, submitted_at, status, status_history)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            inquiry.id,
            inquiry.full_name,
            inquiry.email,
            inquiry.subject,
            inquiry.message,
            format_ts(&inquiry.submitted_at),
            inquiry.status.as_str(),
            serde_json::to_string(&inquiry.status_history)?,
        ],
    )?;
    Ok(())
}

pub fn get_inquiry_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Inquiry>> {
    let result = conn.query_row(
        "SELECT id, full_name, email, subject, message, submitted_at, status, status_history
         FROM inquiries WHERE id = ?1",
        params![id],
        |row| Ok(parse_inquiry_row(row)),
    );

    match result {
        Ok(inquiry) => Ok(Some(inquiry?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_inquiry_row(row: &rusqlite::Row) -> anyhow::Result<Inquiry> {
    let submitted_at: String = row.get(5)?;
    let status: String = row.get(6)?;
    let history: String = row.get(7)?;

    Ok(Inquiry {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        subject: row.get(3)?,
        message: row.get(4)?,
        submitted_at: parse_ts(&submitted_at)?,
        status: InquiryStatus::parse(&status),
        status_history: parse_history(&history)?,
    })
}

// ── Logbook ──

pub fn create_logbook_entry(conn: &Connection, entry: &LogbookEntry) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO logbook (id, name, gender, address, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.id,
            entry.name,
            entry.gender,
            entry.address,
            format_ts(&entry.timestamp),
        ],
    )?;
    Ok(())
}

pub fn get_logbook_entries(conn: &Connection, limit: i64) -> anyhow::Result<Vec<LogbookEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, gender, address, timestamp FROM logbook ORDER BY timestamp DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| Ok(parse_logbook_row(row)))?;

    let mut entries = vec![];
    for row in rows {
        entries.push(row??);
    }
    Ok(entries)
}

fn parse_logbook_row(row: &rusqlite::Row) -> anyhow::Result<LogbookEntry> {
    let timestamp: String = row.get(4)?;

    Ok(LogbookEntry {
        id: row.get(0)?,
        name: row.get(1)?,
        gender: row.get(2)?,
        address: row.get(3)?,
        timestamp: parse_ts(&timestamp)?,
    })
}

// ── Artifacts ──

const ARTIFACT_COLUMNS: &str =
    "id, artifact_name, description, location, acquisition_date, loan_status, image";

pub fn list_artifacts(conn: &Connection) -> anyhow::Result<Vec<Artifact>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ARTIFACT_COLUMNS} FROM artifacts ORDER BY artifact_name ASC"
    ))?;
    let artifacts = stmt
        .query_map([], parse_artifact_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(artifacts)
}

pub fn get_artifact_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Artifact>> {
    let artifact = conn
        .query_row(
            &format!("SELECT {ARTIFACT_COLUMNS} FROM artifacts WHERE id = ?1"),
            params![id],
            parse_artifact_row,
        )
        .optional()?;
    Ok(artifact)
}

pub fn insert_artifact(conn: &Connection, artifact: &Artifact) -> anyhow::Result<()> {
    conn.execute(
        &format!("INSERT INTO artifacts ({ARTIFACT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
        params![
            artifact.id,
            artifact.artifact_name,
            artifact.description,
            artifact.location,
            artifact.acquisition_date,
            artifact.loan_status,
            artifact.image,
        ],
    )?;
    Ok(())
}

fn parse_artifact_row(row: &rusqlite::Row) -> rusqlite::Result<Artifact> {
    Ok(Artifact {
        id: row.get(0)?,
        artifact_name: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        acquisition_date: row.get(4)?,
        loan_status: row.get(5)?,
        image: row.get(6)?,
    })
}

// ── Helpers ──

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(s: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("invalid stored timestamp: {s}"))
}

fn parse_history<S: DeserializeOwned>(json: &str) -> anyhow::Result<Vec<StatusChange<S>>> {
    serde_json::from_str(json).context("invalid stored status history")
}
