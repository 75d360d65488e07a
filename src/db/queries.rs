use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};

use crate::models::{Appointment, AppointmentStatus, Department, Slot, TimeOfDay};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Slots ──

/// Inserts the catalogue when the table is empty. Returns the number of rows written.
pub fn seed_slots(conn: &Connection, slots: &[Slot]) -> anyhow::Result<usize> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM slots", [], |row| row.get(0))?;
    if existing > 0 {
        return Ok(0);
    }

    let mut inserted = 0;
    for slot in slots {
        inserted += conn.execute(
            "INSERT INTO slots (slot_id, doctor_id, doctor_name, department, date, time, time_of_day, location, duration_minutes, booked)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                slot.slot_id,
                slot.doctor_id,
                slot.doctor_name,
                slot.department.as_str(),
                slot.date.format("%Y-%m-%d").to_string(),
                slot.time,
                slot.time_of_day.as_str(),
                slot.location,
                slot.duration_minutes,
                slot.booked,
            ],
        )?;
    }
    Ok(inserted)
}

pub fn list_slots(conn: &Connection) -> anyhow::Result<Vec<Slot>> {
    let mut stmt = conn.prepare(
        "SELECT slot_id, doctor_id, doctor_name, department, date, time, time_of_day, location, duration_minutes, booked
         FROM slots ORDER BY position ASC",
    )?;

    let rows = stmt.query_map([], |row| Ok(parse_slot_row(row)))?;

    let mut slots = vec![];
    for row in rows {
        slots.push(row??);
    }
    Ok(slots)
}

pub fn get_slot(conn: &Connection, slot_id: &str) -> anyhow::Result<Option<Slot>> {
    let result = conn.query_row(
        "SELECT slot_id, doctor_id, doctor_name, department, date, time, time_of_day, location, duration_minutes, booked
         FROM slots WHERE slot_id = ?1",
        params![slot_id],
        |row| Ok(parse_slot_row(row)),
    );

    match result {
        Ok(slot) => Ok(Some(slot?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Compare-and-set on the booked flag: only an unbooked slot can be claimed.
pub fn claim_slot(conn: &Connection, slot_id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE slots SET booked = 1 WHERE slot_id = ?1 AND booked = 0",
        params![slot_id],
    )?;
    Ok(count > 0)
}

pub fn release_slot(conn: &Connection, slot_id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE slots SET booked = 0 WHERE slot_id = ?1",
        params![slot_id],
    )?;
    Ok(count > 0)
}

fn parse_slot_row(row: &rusqlite::Row) -> anyhow::Result<Slot> {
    let department_str: String = row.get(3)?;
    let date_str: String = row.get(4)?;
    let bucket_str: String = row.get(6)?;

    Ok(Slot {
        slot_id: row.get(0)?,
        doctor_id: row.get(1)?,
        doctor_name: row.get(2)?,
        department: Department::from_name(&department_str)
            .ok_or_else(|| anyhow::anyhow!("unknown department in slots table: {department_str}"))?,
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")?,
        time: row.get(5)?,
        time_of_day: TimeOfDay::from_name(&bucket_str)
            .ok_or_else(|| anyhow::anyhow!("unknown time of day in slots table: {bucket_str}"))?,
        location: row.get(7)?,
        duration_minutes: row.get(8)?,
        booked: row.get(9)?,
    })
}

// ── Appointments ──

pub fn insert_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO appointments (id, user_id, slot_id, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            appointment.id,
            appointment.user_id,
            appointment.slot_id,
            appointment.status.as_str(),
            appointment.created_at.format(TS_FORMAT).to_string(),
            appointment.updated_at.format(TS_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &str) -> anyhow::Result<Option<Appointment>> {
    let result = conn.query_row(
        "SELECT id, user_id, slot_id, status, created_at, updated_at FROM appointments WHERE id = ?1",
        params![id],
        |row| Ok(parse_appointment_row(row)),
    );

    match result {
        Ok(appointment) => Ok(Some(appointment?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE appointments SET slot_id = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
        params![
            appointment.slot_id,
            appointment.status.as_str(),
            appointment.updated_at.format(TS_FORMAT).to_string(),
            appointment.id,
        ],
    )?;
    Ok(count > 0)
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let status_str: String = row.get(3)?;
    let created_at_str: String = row.get(4)?;
    let updated_at_str: String = row.get(5)?;

    Ok(Appointment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        slot_id: row.get(2)?,
        status: AppointmentStatus::parse(&status_str),
        created_at: NaiveDateTime::parse_from_str(&created_at_str, TS_FORMAT)?,
        updated_at: NaiveDateTime::parse_from_str(&updated_at_str, TS_FORMAT)?,
    })
}
