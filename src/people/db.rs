use anyhow::{Error, Result};
use rusqlite::{OptionalExtension, Row};
use tokio_rusqlite::Connection;

use super::models::Person;

const PERSON_COLUMNS: &str = "id, user_id, name, birthday, anniversary, anniversary_title, relationship, allergies, likes, dislikes";

pub(crate) fn person_from_row(row: &Row) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        birthday: row.get(3)?,
        anniversary: row.get(4)?,
        anniversary_title: row.get(5)?,
        relationship: row.get(6)?,
        allergies: row.get(7)?,
        likes: row.get(8)?,
        dislikes: row.get(9)?,
    })
}

pub async fn list_people(db: &Connection, user_id: i64) -> Result<Vec<Person>, Error> {
    let people = db
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM person WHERE user_id = ? ORDER BY name COLLATE NOCASE, id",
                PERSON_COLUMNS
            ))?;
            let people = stmt
                .query_map([user_id], person_from_row)?
                .collect::<rusqlite::Result<Vec<Person>>>()?;
            Ok(people)
        })
        .await?;
    Ok(people)
}

/// The person with `person_id` if it belongs to `user_id`.
pub async fn get_person(db: &Connection, user_id: i64, person_id: i64) -> Result<Option<Person>, Error> {
    let person = db
        .call(move |conn| {
            let person = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM person WHERE id = ? AND user_id = ?",
                        PERSON_COLUMNS
                    ),
                    [person_id, user_id],
                    person_from_row,
                )
                .optional()?;
            Ok(person)
        })
        .await?;
    Ok(person)
}

pub async fn find_person_by_name(
    db: &Connection,
    user_id: i64,
    name: &str,
) -> Result<Option<Person>, Error> {
    let name = name.to_owned();
    let person = db
        .call(move |conn| {
            let person = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM person WHERE user_id = ? AND name = ? ORDER BY id LIMIT 1",
                        PERSON_COLUMNS
                    ),
                    tokio_rusqlite::params![user_id, name],
                    person_from_row,
                )
                .optional()?;
            Ok(person)
        })
        .await?;
    Ok(person)
}

pub async fn create_person(db: &Connection, user_id: i64, name: &str) -> Result<Person, Error> {
    let name = name.to_owned();
    let person = db
        .call(move |conn| {
            let person = conn.query_row(
                &format!(
                    "INSERT INTO person (user_id, name) VALUES (?, ?) RETURNING {}",
                    PERSON_COLUMNS
                ),
                tokio_rusqlite::params![user_id, name],
                person_from_row,
            )?;
            Ok(person)
        })
        .await?;
    Ok(person)
}

/// Write every editable field of `person`.
pub async fn update_person(db: &Connection, person: &Person) -> Result<(), Error> {
    let person = person.clone();
    db.call(move |conn| {
        conn.execute(
            r"
            UPDATE person SET
              name = ?,
              birthday = ?,
              anniversary = ?,
              anniversary_title = ?,
              relationship = ?,
              allergies = ?,
              likes = ?,
              dislikes = ?
            WHERE id = ? AND user_id = ?
            ",
            tokio_rusqlite::params![
                person.name,
                person.birthday,
                person.anniversary,
                person.anniversary_title,
                person.relationship,
                person.allergies,
                person.likes,
                person.dislikes,
                person.id,
                person.user_id,
            ],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

/// Delete a person and their group memberships. Returns false when no
/// such person belongs to `user_id`.
pub async fn delete_person(db: &Connection, user_id: i64, person_id: i64) -> Result<bool, Error> {
    let removed = db
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM person WHERE id = ? AND user_id = ?",
                [person_id, user_id],
            )?;
            Ok(removed)
        })
        .await?;
    Ok(removed > 0)
}
