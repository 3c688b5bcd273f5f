use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{WolfStreetError, WolfStreetResult};
use crate::session::Profile;

const COLUMNS: &str = "user_id, email, full_name, is_approved, is_admin";

pub(crate) enum Flag {
    Approved,
    Admin,
}

fn from_row(row: &Row) -> rusqlite::Result<Profile> {
    Ok(Profile {
        user_id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        is_approved: row.get(3)?,
        is_admin: row.get(4)?,
    })
}

/// Register a profile, or refresh the contact fields of an existing one.
/// Approval and admin flags are never touched here; new profiles start
/// unapproved.
pub(crate) fn upsert(
    conn: &Connection,
    user_id: &str,
    email: &str,
    full_name: Option<&str>,
) -> WolfStreetResult<Profile> {
    if email.trim().is_empty() {
        return Err(WolfStreetError::Validation("Email is required".into()));
    }

    conn.execute(
        "INSERT INTO profiles (user_id, email, full_name, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id) DO UPDATE SET
             email = excluded.email,
             full_name = excluded.full_name",
        params![user_id, email.trim(), full_name, Utc::now()],
    )?;

    get(conn, user_id)
}

pub(crate) fn get(conn: &Connection, user_id: &str) -> WolfStreetResult<Profile> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM profiles WHERE user_id = ?1"),
        params![user_id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| WolfStreetError::not_found("Profile", user_id))
}

pub(crate) fn list(conn: &Connection) -> WolfStreetResult<Vec<Profile>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM profiles ORDER BY created_at ASC"
    ))?;
    let rows = stmt.query_map([], from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(crate) fn set_flag(
    conn: &Connection,
    user_id: &str,
    flag: Flag,
    value: bool,
) -> WolfStreetResult<Profile> {
    let sql = match flag {
        Flag::Approved => "UPDATE profiles SET is_approved = ?2 WHERE user_id = ?1",
        Flag::Admin => "UPDATE profiles SET is_admin = ?2 WHERE user_id = ?1",
    };

    if conn.execute(sql, params![user_id, value])? == 0 {
        return Err(WolfStreetError::not_found("Profile", user_id));
    }
    get(conn, user_id)
}

#[cfg(test)]
mod tests {
    use crate::store::Store;

    #[test]
    fn new_profiles_start_unapproved() {
        let store = Store::open_in_memory().unwrap();
        let profile = store
            .upsert_profile("u1", "dana@example.com", Some("Dana"))
            .unwrap();

        assert!(!profile.is_approved);
        assert!(!profile.is_admin);
        assert_eq!(profile.full_name.as_deref(), Some("Dana"));
    }

    #[test]
    fn upsert_keeps_approval_flags() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_profile("u1", "dana@example.com", None).unwrap();
        store.set_approval("u1", true).unwrap();

        let profile = store
            .upsert_profile("u1", "dana@corp.example", None)
            .unwrap();
        assert!(profile.is_approved);
        assert_eq!(profile.email, "dana@corp.example");
    }

    #[test]
    fn flags_on_unknown_profile_are_not_found() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.set_admin("ghost", true).is_err());
        assert!(store.list_profiles().unwrap().is_empty());
    }
}
