use uuid::Uuid;

/// Length of a span identifier in hex characters.
pub const SPAN_ID_LEN: usize = 16;

/// Generates a 32-character lowercase-hex trace identifier.
///
/// Identifiers are random per invocation; rebuilding the same run yields a
/// fresh trace.
pub fn trace_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Generates a 16-character lowercase-hex span identifier.
pub fn span_id() -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(SPAN_ID_LEN);
    hex
}
