//! Embedded SQL migrations
//!
//! Migrations are embedded at compile time using include_str!

/// Migration metadata
pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// Get all embedded migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_organizations_and_snapshots",
            sql: include_str!("../../migrations/001_organizations_and_snapshots.sql"),
        },
        Migration {
            id: "002_vendor_tables",
            sql: include_str!("../../migrations/002_vendor_tables.sql"),
        },
        Migration {
            id: "003_compliance_tables",
            sql: include_str!("../../migrations/003_compliance_tables.sql"),
        },
        Migration {
            id: "004_junction_tables",
            sql: include_str!("../../migrations/004_junction_tables.sql"),
        },
    ]
}
