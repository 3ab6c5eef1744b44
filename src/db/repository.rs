use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::{ActionItem, ItemEdits, ItemStatus, Transcript, User, Workspace};

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DatabaseError::InvalidTimestamp(s.to_string()))
}

fn parse_id(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|_| DatabaseError::InvalidId(s.to_string()))
}

// ═══════════════════════════════════════════
// User Repository
// ═══════════════════════════════════════════

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, user_name, created_at) VALUES (?1, ?2, ?3)",
        params![
            user.id.to_string(),
            user.user_name,
            user.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, user_name, created_at FROM users WHERE id = ?1")?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    });

    match result {
        Ok((id, user_name, created_at)) => Ok(Some(User {
            id: parse_id(&id)?,
            user_name,
            created_at: parse_timestamp(&created_at)?,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ═══════════════════════════════════════════
// Workspace Repository
// ═══════════════════════════════════════════

pub fn insert_workspace(conn: &Connection, ws: &Workspace) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO workspaces (id, name, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            ws.id.to_string(),
            ws.name,
            ws.user_id.to_string(),
            ws.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_workspaces(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Workspace>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, user_id, created_at FROM workspaces
         WHERE user_id = ?1 ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![user_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut workspaces = Vec::new();
    for row in rows {
        let (id, name, user_id, created_at) = row?;
        workspaces.push(Workspace {
            id: parse_id(&id)?,
            name,
            user_id: parse_id(&user_id)?,
            created_at: parse_timestamp(&created_at)?,
        });
    }
    Ok(workspaces)
}

pub fn delete_workspace(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM workspaces WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "workspace".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ═══════════════════════════════════════════
// Transcript Repository
// ═══════════════════════════════════════════

pub fn insert_transcript(
    conn: &Connection,
    id: &Uuid,
    workspace_id: &Uuid,
    content: &str,
    created_at: &DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO transcripts (id, content, workspace_id, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            id.to_string(),
            content,
            workspace_id.to_string(),
            created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// List a workspace's transcripts newest first, each with its action items
/// in insertion order.
pub fn list_transcripts(
    conn: &Connection,
    workspace_id: &Uuid,
) -> Result<Vec<Transcript>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, content, created_at FROM transcripts
         WHERE workspace_id = ?1 ORDER BY created_at DESC, id",
    )?;

    let rows = stmt.query_map(params![workspace_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut transcripts = Vec::new();
    for row in rows {
        let (id, content, created_at) = row?;
        let id = parse_id(&id)?;
        transcripts.push(Transcript {
            id,
            content,
            created_at: parse_timestamp(&created_at)?,
            action_items: list_action_items(conn, &id)?,
        });
    }
    Ok(transcripts)
}

pub fn delete_transcript(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM transcripts WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "transcript".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ═══════════════════════════════════════════
// Action Item Repository
// ═══════════════════════════════════════════

pub fn insert_action_item(
    conn: &Connection,
    transcript_id: &Uuid,
    item: &ActionItem,
    position: i64,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO action_items (id, transcript_id, task, owner, due_date, status, position, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            item.id.to_string(),
            transcript_id.to_string(),
            item.task,
            item.owner,
            item.due_date,
            item.status.as_str(),
            position,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_action_items(
    conn: &Connection,
    transcript_id: &Uuid,
) -> Result<Vec<ActionItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, task, owner, due_date, status FROM action_items
         WHERE transcript_id = ?1 ORDER BY position, created_at, id",
    )?;

    let rows = stmt.query_map(params![transcript_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut items = Vec::new();
    for row in rows {
        let (id, task, owner, due_date, status) = row?;
        items.push(ActionItem {
            id: parse_id(&id)?,
            task,
            owner,
            due_date,
            status: status.parse::<ItemStatus>()?,
        });
    }
    Ok(items)
}

pub fn get_action_item(conn: &Connection, id: &Uuid) -> Result<Option<ActionItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, task, owner, due_date, status FROM action_items WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, String>(4)?,
        ))
    });

    match result {
        Ok((id, task, owner, due_date, status)) => Ok(Some(ActionItem {
            id: parse_id(&id)?,
            task,
            owner,
            due_date,
            status: status.parse::<ItemStatus>()?,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Apply a partial edit. Absent fields keep their stored value; explicit
/// nulls clear owner/due date, so the edit is merged in memory and the
/// full row written back.
pub fn update_action_item(
    conn: &Connection,
    id: &Uuid,
    edits: &ItemEdits,
) -> Result<(), DatabaseError> {
    let mut item = get_action_item(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "action_item".into(),
        id: id.to_string(),
    })?;
    edits.apply(&mut item);

    conn.execute(
        "UPDATE action_items SET task = ?2, owner = ?3, due_date = ?4, status = ?5
         WHERE id = ?1",
        params![
            id.to_string(),
            item.task,
            item.owner,
            item.due_date,
            item.status.as_str(),
        ],
    )?;
    Ok(())
}

pub fn delete_action_item(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM action_items WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "action_item".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn seeded(conn: &Connection) -> (User, Workspace) {
        let user = User {
            id: Uuid::new_v4(),
            user_name: "test-user".into(),
            created_at: Utc::now(),
        };
        insert_user(conn, &user).unwrap();

        let ws = Workspace {
            id: Uuid::new_v4(),
            name: "My Workspace".into(),
            user_id: user.id,
            created_at: Utc::now(),
        };
        insert_workspace(conn, &ws).unwrap();
        (user, ws)
    }

    #[test]
    fn user_round_trip() {
        let conn = open_memory_database().unwrap();
        let (user, _) = seeded(&conn);

        let fetched = get_user(&conn, &user.id).unwrap().unwrap();
        assert_eq!(fetched.user_name, "test-user");
        assert!(get_user(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn workspaces_listed_newest_first() {
        let conn = open_memory_database().unwrap();
        let (user, _first) = seeded(&conn);

        let second = Workspace {
            id: Uuid::new_v4(),
            name: "Second".into(),
            user_id: user.id,
            created_at: Utc::now() + chrono::Duration::seconds(10),
        };
        insert_workspace(&conn, &second).unwrap();

        let list = list_workspaces(&conn, &user.id).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Second");
    }

    #[test]
    fn transcript_with_items_round_trip() {
        let conn = open_memory_database().unwrap();
        let (_, ws) = seeded(&conn);

        let tr_id = Uuid::new_v4();
        insert_transcript(&conn, &tr_id, &ws.id, "meeting notes", &Utc::now()).unwrap();

        let mut first = ActionItem::open("Call bank about loan");
        first.owner = Some("Sam".into());
        let second = ActionItem::open("Email client invoice");
        insert_action_item(&conn, &tr_id, &first, 0).unwrap();
        insert_action_item(&conn, &tr_id, &second, 1).unwrap();

        let transcripts = list_transcripts(&conn, &ws.id).unwrap();
        assert_eq!(transcripts.len(), 1);
        assert_eq!(transcripts[0].content, "meeting notes");
        let items = &transcripts[0].action_items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].task, "Call bank about loan");
        assert_eq!(items[0].owner.as_deref(), Some("Sam"));
        assert_eq!(items[1].task, "Email client invoice");
    }

    #[test]
    fn partial_update_keeps_untouched_fields() {
        let conn = open_memory_database().unwrap();
        let (_, ws) = seeded(&conn);

        let tr_id = Uuid::new_v4();
        insert_transcript(&conn, &tr_id, &ws.id, "notes", &Utc::now()).unwrap();
        let mut item = ActionItem::open("Draft proposal");
        item.owner = Some("Ana".into());
        insert_action_item(&conn, &tr_id, &item, 0).unwrap();

        update_action_item(&conn, &item.id, &ItemEdits::status(ItemStatus::Done)).unwrap();

        let items = list_action_items(&conn, &tr_id).unwrap();
        assert_eq!(items[0].status, ItemStatus::Done);
        assert_eq!(items[0].task, "Draft proposal");
        assert_eq!(items[0].owner.as_deref(), Some("Ana"));
    }

    #[test]
    fn explicit_null_update_clears_owner() {
        let conn = open_memory_database().unwrap();
        let (_, ws) = seeded(&conn);

        let tr_id = Uuid::new_v4();
        insert_transcript(&conn, &tr_id, &ws.id, "notes", &Utc::now()).unwrap();
        let mut item = ActionItem::open("Draft proposal");
        item.owner = Some("Ana".into());
        item.due_date = Some("2026-03-01".into());
        insert_action_item(&conn, &tr_id, &item, 0).unwrap();

        let edits = ItemEdits {
            owner: Some(None),
            ..ItemEdits::default()
        };
        update_action_item(&conn, &item.id, &edits).unwrap();

        let fetched = get_action_item(&conn, &item.id).unwrap().unwrap();
        assert!(fetched.owner.is_none());
        assert_eq!(fetched.due_date.as_deref(), Some("2026-03-01"));
        assert_eq!(fetched.task, "Draft proposal");
    }

    #[test]
    fn update_missing_item_is_not_found() {
        let conn = open_memory_database().unwrap();
        let result = update_action_item(
            &conn,
            &Uuid::new_v4(),
            &ItemEdits::status(ItemStatus::Done),
        );
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn deleting_transcript_cascades_to_items() {
        let conn = open_memory_database().unwrap();
        let (_, ws) = seeded(&conn);

        let tr_id = Uuid::new_v4();
        insert_transcript(&conn, &tr_id, &ws.id, "notes", &Utc::now()).unwrap();
        insert_action_item(&conn, &tr_id, &ActionItem::open("task"), 0).unwrap();

        delete_transcript(&conn, &tr_id).unwrap();

        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM action_items", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn deleting_workspace_cascades_to_transcripts() {
        let conn = open_memory_database().unwrap();
        let (_, ws) = seeded(&conn);
        let tr_id = Uuid::new_v4();
        insert_transcript(&conn, &tr_id, &ws.id, "notes", &Utc::now()).unwrap();

        delete_workspace(&conn, &ws.id).unwrap();

        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM transcripts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn delete_missing_rows_report_not_found() {
        let conn = open_memory_database().unwrap();
        assert!(matches!(
            delete_transcript(&conn, &Uuid::new_v4()),
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(matches!(
            delete_action_item(&conn, &Uuid::new_v4()),
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
