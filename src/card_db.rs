use crate::heuristics::CardFields;
use rusqlite::{Connection, Result as SqliteResult, params};
use std::path::Path;
use tracing::info;

pub struct CardStore {
    conn: Connection,
}

/// A business card row read back from `bizcard_details`.
#[derive(Debug, Clone)]
pub struct StoredCard {
    /// SQLite's implicit rowid; the table itself declares no key.
    pub rowid: i64,
    pub fields: CardFields,
    pub image: Vec<u8>,
}

const CARD_COLUMNS: &str =
    "rowid, name, designation, company_name, contact, email, website, address, pincode, image";

impl CardStore {
    /// Open (or create) the card store with SQLite backend
    pub fn new<P: AsRef<Path>>(db_path: P) -> SqliteResult<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.create_table_if_absent()?;
        Ok(store)
    }

    pub fn create_table_if_absent(&self) -> SqliteResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS bizcard_details (
                name TEXT,
                designation TEXT,
                company_name TEXT,
                contact TEXT,
                email TEXT,
                website TEXT,
                address TEXT,
                pincode TEXT,
                image BLOB
            )",
            [],
        )?;
        Ok(())
    }

    /// Append one card. Duplicates are allowed.
    pub fn insert(&self, fields: &CardFields, image: &[u8]) -> SqliteResult<i64> {
        insert_card(&self.conn, fields, image)?;
        let rowid = self.conn.last_insert_rowid();
        info!(rowid, name = %fields.name, "Card stored");
        Ok(rowid)
    }

    /// Every stored card, in insertion order.
    pub fn select_all(&self) -> SqliteResult<Vec<StoredCard>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM bizcard_details ORDER BY rowid"
        ))?;
        let rows = stmt.query_map([], |row| Self::row_to_card(row))?;
        rows.collect()
    }

    pub fn find_by_name(&self, name: &str) -> SqliteResult<Vec<StoredCard>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM bizcard_details WHERE name = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt.query_map(params![name], |row| Self::row_to_card(row))?;
        rows.collect()
    }

    /// Distinct names, first-seen order, for the selection lists.
    pub fn names(&self) -> SqliteResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM bizcard_details GROUP BY name ORDER BY MIN(rowid)",
        )?;
        let names = stmt.query_map([], |row| row.get(0))?;
        names.collect()
    }

    pub fn designations_for(&self, name: &str) -> SqliteResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT designation FROM bizcard_details WHERE name = ?1 ORDER BY rowid",
        )?;
        let designations = stmt.query_map(params![name], |row| row.get(0))?;
        designations.collect()
    }

    pub fn image(&self, rowid: i64) -> SqliteResult<Option<Vec<u8>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT image FROM bizcard_details WHERE rowid = ?1")?;
        let mut rows = stmt.query(params![rowid])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Delete every row with `name`, narrowed to `designation` when given.
    /// Returns the number of rows removed; zero is not an error.
    pub fn delete_where(&self, name: &str, designation: Option<&str>) -> SqliteResult<usize> {
        let removed = match designation {
            Some(designation) => self.conn.execute(
                "DELETE FROM bizcard_details WHERE name = ?1 AND designation = ?2",
                params![name, designation],
            )?,
            None => self
                .conn
                .execute("DELETE FROM bizcard_details WHERE name = ?1", params![name])?,
        };
        info!(name = %name, designation = ?designation, removed, "Cards deleted");
        Ok(removed)
    }

    /// Replace the cards named `original_name` with one edited card.
    ///
    /// All rows sharing that name are deleted, then a single row is inserted
    /// carrying the image of the first deleted row. Fails with
    /// `QueryReturnedNoRows` if no card has that name.
    pub fn modify(&mut self, original_name: &str, fields: &CardFields) -> SqliteResult<usize> {
        let tx = self.conn.transaction()?;
        let image: Vec<u8> = tx.query_row(
            "SELECT image FROM bizcard_details WHERE name = ?1 ORDER BY rowid LIMIT 1",
            params![original_name],
            |row| row.get(0),
        )?;
        let removed = tx.execute(
            "DELETE FROM bizcard_details WHERE name = ?1",
            params![original_name],
        )?;
        insert_card(&tx, fields, &image)?;
        tx.commit()?;

        info!(
            original = %original_name,
            name = %fields.name,
            removed,
            "Card modified"
        );
        Ok(removed)
    }

    pub fn count(&self) -> SqliteResult<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM bizcard_details", [], |row| row.get(0))
    }

    /// Helper: map a row with the `CARD_COLUMNS` projection to `StoredCard`.
    fn row_to_card(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredCard> {
        Ok(StoredCard {
            rowid: row.get(0)?,
            fields: CardFields {
                name: row.get(1)?,
                designation: row.get(2)?,
                company_name: row.get(3)?,
                contact: row.get(4)?,
                email: row.get(5)?,
                website: row.get(6)?,
                address: row.get(7)?,
                pincode: row.get(8)?,
            },
            image: row.get(9)?,
        })
    }
}

fn insert_card(conn: &Connection, fields: &CardFields, image: &[u8]) -> SqliteResult<()> {
    conn.execute(
        "INSERT INTO bizcard_details
            (name, designation, company_name, contact, email, website, address, pincode, image)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            fields.name,
            fields.designation,
            fields.company_name,
            fields.contact,
            fields.email,
            fields.website,
            fields.address,
            fields.pincode,
            image,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, designation: &str) -> CardFields {
        CardFields {
            name: name.to_string(),
            designation: designation.to_string(),
            company_name: "Acme Corp".to_string(),
            contact: "+1-555-2020".to_string(),
            email: "NA".to_string(),
            website: "www.acme.com".to_string(),
            address: "12 Main St".to_string(),
            pincode: "600001".to_string(),
        }
    }

    fn memory_store() -> CardStore {
        CardStore::new(":memory:").unwrap()
    }

    #[test]
    fn test_create_table_is_idempotent() {
        let store = memory_store();
        store.create_table_if_absent().unwrap();
        store.create_table_if_absent().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_and_select_all() {
        let store = memory_store();
        let image = vec![0x89, b'P', b'N', b'G', 0, 255];
        store.insert(&fields("Jane Doe", "CEO"), &image).unwrap();
        store.insert(&fields("Jane Doe", "CEO"), &[]).unwrap();

        let cards = store.select_all().unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].fields, fields("Jane Doe", "CEO"));
        assert_eq!(cards[0].image, image);
        assert!(cards[1].image.is_empty());
        assert_eq!(store.image(cards[0].rowid).unwrap(), Some(image));
        assert_eq!(store.image(9999).unwrap(), None);
    }

    #[test]
    fn test_names_and_designations() {
        let store = memory_store();
        store.insert(&fields("Jane", "CEO"), &[]).unwrap();
        store.insert(&fields("Raj", "CTO"), &[]).unwrap();
        store.insert(&fields("Jane", "Founder"), &[]).unwrap();

        assert_eq!(store.names().unwrap(), vec!["Jane", "Raj"]);
        assert_eq!(store.designations_for("Jane").unwrap(), vec!["CEO", "Founder"]);
        assert!(store.designations_for("Nobody").unwrap().is_empty());
    }

    #[test]
    fn test_delete_where_both_match() {
        let store = memory_store();
        store.insert(&fields("Jane", "CEO"), &[]).unwrap();
        store.insert(&fields("Jane", "Founder"), &[]).unwrap();

        assert_eq!(store.delete_where("Jane", Some("CEO")).unwrap(), 1);
        let left = store.select_all().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].fields.designation, "Founder");

        assert_eq!(store.delete_where("Nobody", None).unwrap(), 0);
        assert_eq!(store.delete_where("Jane", None).unwrap(), 1);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_modify_replaces_every_duplicate() {
        let mut store = memory_store();
        store.insert(&fields("Jane", "CEO"), b"first").unwrap();
        store.insert(&fields("Jane", "Founder"), b"second").unwrap();
        store.insert(&fields("Raj", "CTO"), b"raj").unwrap();

        let edited = fields("Jane Doe", "Chair");
        assert_eq!(store.modify("Jane", &edited).unwrap(), 2);

        let cards = store.select_all().unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].fields.name, "Raj");
        assert_eq!(cards[1].fields, edited);
        assert_eq!(cards[1].image, b"first".to_vec());
    }

    #[test]
    fn test_modify_unknown_name_changes_nothing() {
        let mut store = memory_store();
        store.insert(&fields("Jane", "CEO"), &[]).unwrap();

        let err = store.modify("Nobody", &fields("X", "Y")).unwrap_err();
        assert!(matches!(err, rusqlite::Error::QueryReturnedNoRows));
        assert_eq!(store.count().unwrap(), 1);
    }
}
