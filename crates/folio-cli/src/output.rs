//! Rendering of principals and sessions, as tables for operators or JSON
//! for scripts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::{Table, Tabled};

use folio_core::error::AppError;
use folio_entity::session::Session;
use folio_entity::user::Principal;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Session ids are 43 characters; this many identify one in practice.
const SESSION_ID_PREFIX: usize = 12;
const USER_AGENT_WIDTH: usize = 40;

fn stamp(t: Option<DateTime<Utc>>) -> String {
    t.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn stamp_millis(ms: i64) -> String {
    stamp(DateTime::<Utc>::from_timestamp_millis(ms))
}

/// Principal display row
#[derive(Debug, Serialize, Tabled)]
struct PrincipalRow {
    id: String,
    email: String,
    role: String,
    failures: i32,
    locked_until: String,
    last_login: String,
}

impl From<&Principal> for PrincipalRow {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id.to_string(),
            email: p.email.clone(),
            role: p.role.to_string(),
            failures: p.failed_login_attempts,
            locked_until: stamp(p.lock_until),
            last_login: stamp(p.last_login),
        }
    }
}

/// Session display row. The id is cut short in tables only; JSON carries
/// the full record so scripts can feed it back to `session revoke --id`.
#[derive(Debug, Serialize, Tabled)]
struct SessionRow {
    id: String,
    ip: String,
    user_agent: String,
    created: String,
    expires: String,
}

impl From<&Session> for SessionRow {
    fn from(s: &Session) -> Self {
        Self {
            id: s.session_id.chars().take(SESSION_ID_PREFIX).collect(),
            ip: s.ip_address.clone(),
            user_agent: s.user_agent.chars().take(USER_AGENT_WIDTH).collect(),
            created: stamp_millis(s.created_at),
            expires: stamp_millis(s.expires_at),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::internal(format!("Failed to render JSON: {e}")))
}

fn render_table<R: Tabled>(rows: Vec<R>, empty: &str) -> String {
    if rows.is_empty() {
        empty.to_string()
    } else {
        Table::new(rows).to_string()
    }
}

fn render_principals(principals: &[Principal], format: OutputFormat) -> Result<String, AppError> {
    match format {
        OutputFormat::Table => Ok(render_table(
            principals.iter().map(PrincipalRow::from).collect(),
            "No principals.",
        )),
        OutputFormat::Json => {
            let rows: Vec<PrincipalRow> = principals.iter().map(PrincipalRow::from).collect();
            to_json(&rows)
        }
    }
}

fn render_sessions(sessions: &[Session], format: OutputFormat) -> Result<String, AppError> {
    match format {
        OutputFormat::Table => Ok(render_table(
            sessions.iter().map(SessionRow::from).collect(),
            "No live sessions.",
        )),
        OutputFormat::Json => to_json(sessions),
    }
}

/// Print principals, without password hashes.
pub fn print_principals(principals: &[Principal], format: OutputFormat) -> Result<(), AppError> {
    println!("{}", render_principals(principals, format)?);
    Ok(())
}

/// Print live sessions.
pub fn print_sessions(sessions: &[Session], format: OutputFormat) -> Result<(), AppError> {
    println!("{}", render_sessions(sessions, format)?);
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RevokeReport<'a> {
    user_id: String,
    email: &'a str,
    revoked: u64,
}

/// Print the outcome of a bulk sign-out.
pub fn print_revoked(
    principal: &Principal,
    revoked: u64,
    format: OutputFormat,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Table => {
            print_success(&format!("Revoked {revoked} session(s)"));
            print_kv("Principal", &principal.id.to_string());
            print_kv("Email", &principal.email);
        }
        OutputFormat::Json => println!(
            "{}",
            to_json(&RevokeReport {
                user_id: principal.id.to_string(),
                email: &principal.email,
                revoked,
            })?
        ),
    }
    Ok(())
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

fn print_kv(key: &str, value: &str) {
    println!("  {:<12} {}", format!("{key}:"), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_entity::user::UserRole;

    fn session() -> Session {
        Session {
            session_id: "a".repeat(43),
            user_id: uuid::Uuid::nil(),
            email: "owner@example.com".to_string(),
            role: UserRole::Admin,
            user_agent: "x".repeat(100),
            ip_address: "203.0.113.7".to_string(),
            created_at: 1_700_000_000_000,
            expires_at: 1_700_604_800_000,
        }
    }

    #[test]
    fn test_stamp_formats_and_handles_absence() {
        assert_eq!(stamp_millis(1_700_000_000_000), "2023-11-14 22:13");
        assert_eq!(stamp(None), "-");
    }

    #[test]
    fn test_session_table_truncates_but_json_keeps_full_id() {
        let row = SessionRow::from(&session());
        assert_eq!(row.id.len(), SESSION_ID_PREFIX);
        assert_eq!(row.user_agent.len(), USER_AGENT_WIDTH);

        let json = render_sessions(&[session()], OutputFormat::Json).unwrap();
        assert!(json.contains(&"a".repeat(43)));
    }

    #[test]
    fn test_empty_listings_say_so() {
        assert_eq!(render_sessions(&[], OutputFormat::Table).unwrap(), "No live sessions.");
        assert_eq!(render_principals(&[], OutputFormat::Table).unwrap(), "No principals.");
        assert_eq!(render_sessions(&[], OutputFormat::Json).unwrap(), "[]");
    }
}
