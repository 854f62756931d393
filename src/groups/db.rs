use anyhow::{Error, Result};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use super::models::Group;
use crate::people::db::person_from_row;
use crate::people::{Person, create_person, find_person_by_name};

pub async fn list_groups(db: &Connection, user_id: i64) -> Result<Vec<Group>, Error> {
    let groups = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, group_name FROM person_group WHERE user_id = ? ORDER BY group_name COLLATE NOCASE, id",
            )?;
            let groups = stmt
                .query_map([user_id], |row| {
                    Ok(Group {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        group_name: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<Group>>>()?;
            Ok(groups)
        })
        .await?;
    Ok(groups)
}

pub async fn create_group(db: &Connection, user_id: i64, group_name: &str) -> Result<Group, Error> {
    let group_name = group_name.to_owned();
    let group = db
        .call(move |conn| {
            let id: i64 = conn.query_row(
                "INSERT INTO person_group (user_id, group_name) VALUES (?, ?) RETURNING id",
                tokio_rusqlite::params![user_id, group_name],
                |row| row.get(0),
            )?;
            Ok(Group {
                id,
                user_id,
                group_name,
            })
        })
        .await?;
    Ok(group)
}

/// The group with `group_id` if it belongs to `user_id`.
pub async fn get_group(db: &Connection, user_id: i64, group_id: i64) -> Result<Option<Group>, Error> {
    let group = db
        .call(move |conn| {
            let group = conn
                .query_row(
                    "SELECT id, user_id, group_name FROM person_group WHERE id = ? AND user_id = ?",
                    [group_id, user_id],
                    |row| {
                        Ok(Group {
                            id: row.get(0)?,
                            user_id: row.get(1)?,
                            group_name: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(group)
        })
        .await?;
    Ok(group)
}

/// Delete a group. Its members stay in the address book.
pub async fn delete_group(db: &Connection, user_id: i64, group_id: i64) -> Result<bool, Error> {
    let removed = db
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM person_group WHERE id = ? AND user_id = ?",
                [group_id, user_id],
            )?;
            Ok(removed)
        })
        .await?;
    Ok(removed > 0)
}

pub async fn list_members(db: &Connection, group_id: i64) -> Result<Vec<Person>, Error> {
    let members = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
                SELECT person.id, person.user_id, person.name, person.birthday,
                       person.anniversary, person.anniversary_title, person.relationship,
                       person.allergies, person.likes, person.dislikes
                FROM group_member
                JOIN person ON person.id = group_member.person_id
                WHERE group_member.group_id = ?
                ORDER BY person.name COLLATE NOCASE, person.id
                ",
            )?;
            let members = stmt
                .query_map([group_id], person_from_row)?
                .collect::<rusqlite::Result<Vec<Person>>>()?;
            Ok(members)
        })
        .await?;
    Ok(members)
}

/// Add the person called `name` to a group, creating them when the
/// user has nobody by that name yet.
pub async fn add_member(db: &Connection, group: &Group, name: &str) -> Result<Person, Error> {
    let person = match find_person_by_name(db, group.user_id, name).await? {
        Some(person) => person,
        None => create_person(db, group.user_id, name).await?,
    };

    let person_id = person.id;
    let group_id = group.id;
    db.call(move |conn| {
        conn.execute(
            "INSERT OR IGNORE INTO group_member (person_id, group_id) VALUES (?, ?)",
            [person_id, group_id],
        )?;
        Ok(())
    })
    .await?;

    Ok(person)
}

/// Returns false when the person was not in the group.
pub async fn remove_member(db: &Connection, group_id: i64, person_id: i64) -> Result<bool, Error> {
    let removed = db
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM group_member WHERE group_id = ? AND person_id = ?",
                [group_id, person_id],
            )?;
            Ok(removed)
        })
        .await?;
    Ok(removed > 0)
}
