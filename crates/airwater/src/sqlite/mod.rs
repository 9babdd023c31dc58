use std::path::Path;

use rusqlite::{Connection, OpenFlags};

pub const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

pub fn open_read_only_connection(path: &Path) -> rusqlite::Result<Connection> {
    let connection = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    connection.busy_timeout(std::time::Duration::from_millis(SQLITE_BUSY_TIMEOUT_MS))?;
    Ok(connection)
}

#[cfg(test)]
mod tests {
    use super::open_read_only_connection;
    use rusqlite::Connection;

    fn temp_db_path(label: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("airwater-{label}-{nanos}.sqlite"))
    }

    #[test]
    fn read_only_connection_rejects_writes() {
        let path = temp_db_path("read-only");
        {
            let connection = Connection::open(&path).expect("seed db should open");
            connection
                .execute_batch("CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (1);")
                .expect("seed db should be writable");
        }

        let connection = open_read_only_connection(&path).expect("read-only open should work");
        let value = connection
            .query_row("SELECT v FROM t", [], |row| row.get::<usize, i64>(0))
            .expect("reads should work");
        assert_eq!(value, 1);
        assert!(connection.execute("INSERT INTO t VALUES (2)", []).is_err());
    }

    #[test]
    fn read_only_connection_does_not_create_missing_files() {
        let path = temp_db_path("missing");

        assert!(open_read_only_connection(&path).is_err());
        assert!(!path.exists());
    }
}
