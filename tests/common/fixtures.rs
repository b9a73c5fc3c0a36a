//! Test fixtures - reusable file contents.

/// A small CSV extract
pub const ORDERS_CSV: &str = "order_id,customer,total\n1001,acme,19.99\n1002,globex,5.00\n";

/// A JSON event batch
pub const EVENTS_JSON: &str = r#"[{"type":"click","ts":1700000000},{"type":"view","ts":1700000001}]"#;

/// A zero-byte upload
pub const EMPTY: &str = "";

/// Config file pointing every directory somewhere non-default
pub const CONFIG_CUSTOM_DIRS: &str = r#"
[paths]
landing = "inbox"
bronze = "lake/bronze"
bad_data = "lake/rejected"

[logging]
file = "logs/ingest.log"
"#;

/// Config file with a misspelled key
pub const CONFIG_TYPO: &str = r#"
[paths]
landng = "inbox"
"#;
