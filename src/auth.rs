// 🔐 Session Manager
// Wraps the credential store with register/login/logout and mirrors the
// persisted session in memory. Explicit lifecycle: load on construction,
// clear on logout - no global mutable session state

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::AuthError;
use crate::houses::House;
use crate::store;
use crate::store::UserRecord;

// ============================================================================
// REQUEST SHAPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// ============================================================================
// FIELD VALIDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

fn push_error(errors: &mut Vec<ValidationError>, field: &str, message: &str) {
    errors.push(ValidationError {
        field: field.to_string(),
        message: message.to_string(),
    });
}

/// Syntactic email check: non-empty local part and a dotted domain
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || email.contains(' ') {
        return false;
    }

    match domain.split_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Validate a registration candidate before it reaches the store.
/// Collects every failing field rather than stopping at the first
pub fn validate_registration(req: &RegistrationRequest) -> ValidationResult {
    let mut errors = Vec::new();

    if req.username.len() < 3 {
        push_error(
            &mut errors,
            "username",
            "Username must be at least 3 characters long",
        );
    }
    if req.username.len() > 20 {
        push_error(
            &mut errors,
            "username",
            "Username must be at most 20 characters long",
        );
    }
    if !req
        .username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        push_error(
            &mut errors,
            "username",
            "Username can only contain letters, numbers, and underscores",
        );
    }

    if !is_valid_email(&req.email) {
        push_error(&mut errors, "email", "Please enter a valid email address");
    }

    if req.password.len() < 8 {
        push_error(
            &mut errors,
            "password",
            "Password must be at least 8 characters long",
        );
    }
    if !req.password.chars().any(|c| c.is_ascii_uppercase()) {
        push_error(
            &mut errors,
            "password",
            "Password must contain at least one uppercase letter",
        );
    }
    if !req.password.chars().any(|c| c.is_ascii_lowercase()) {
        push_error(
            &mut errors,
            "password",
            "Password must contain at least one lowercase letter",
        );
    }
    if !req.password.chars().any(|c| c.is_ascii_digit()) {
        push_error(
            &mut errors,
            "password",
            "Password must contain at least one number",
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// SESSION MANAGER
// ============================================================================

/// Gatekeeper for the quiz: owns the store connection plus the in-memory
/// mirror of the persisted session.
///
/// Invariant: the mirror, when present, always refers to a record that
/// exists in the store.
pub struct SessionManager {
    conn: Connection,
    current: Option<UserRecord>,
}

impl SessionManager {
    /// Wrap an existing connection, preparing the schema and loading any
    /// persisted session into the mirror
    pub fn new(conn: Connection) -> anyhow::Result<Self> {
        store::setup_database(&conn)?;
        let current = store::load_session(&conn)?;
        Ok(SessionManager { conn, current })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::new(Connection::open(path)?)
    }

    /// Create a user record, persist it, and establish it as the session.
    /// Duplicate checks are case-sensitive exact matches
    pub fn register(&mut self, req: &RegistrationRequest) -> Result<UserRecord, AuthError> {
        if store::find_user_by_email(&self.conn, &req.email)?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }
        if store::find_user_by_username(&self.conn, &req.username)?.is_some() {
            return Err(AuthError::DuplicateUsername);
        }

        let user = UserRecord::new(&req.username, &req.email, &req.password);
        store::insert_user(&self.conn, &user)?;
        store::save_session(&self.conn, &user.id)?;
        self.current = Some(user.clone());

        Ok(user)
    }

    /// Establish a session for a matching email + password pair.
    /// The same error covers "unknown email" and "wrong password"
    pub fn login(&mut self, credentials: &Credentials) -> Result<UserRecord, AuthError> {
        let user = store::find_user_by_email(&self.conn, &credentials.email)?
            .filter(|u| u.verify_password(&credentials.password))
            .ok_or(AuthError::InvalidCredentials)?;

        store::save_session(&self.conn, &user.id)?;
        self.current = Some(user.clone());

        Ok(user)
    }

    /// Clear the session; idempotent
    pub fn logout(&mut self) -> Result<(), AuthError> {
        store::clear_session(&self.conn)?;
        self.current = None;
        Ok(())
    }

    /// The signed-in user, if any; side-effect-free
    pub fn current_user(&self) -> Option<&UserRecord> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Persist a classification outcome onto a user record. When the
    /// updated record is the signed-in user, the session mirror is
    /// refreshed to match
    pub fn update_user_house(
        &mut self,
        user_id: &str,
        house: House,
    ) -> Result<UserRecord, AuthError> {
        let touched = store::update_user_house(&self.conn, user_id, house)?;
        if touched == 0 {
            return Err(AuthError::UserNotFound(user_id.to_string()));
        }

        let updated = store::find_user_by_id(&self.conn, user_id)?
            .ok_or_else(|| AuthError::UserNotFound(user_id.to_string()))?;

        if self
            .current
            .as_ref()
            .is_some_and(|u| u.id == updated.id)
        {
            self.current = Some(updated.clone());
        }

        Ok(updated)
    }

    /// Give the store connection back, dropping the in-memory mirror
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn harry() -> RegistrationRequest {
        RegistrationRequest {
            username: "harry_potter".to_string(),
            email: "harry@hogwarts.edu".to_string(),
            password: "Expelliarmus1".to_string(),
        }
    }

    #[test]
    fn test_register_establishes_session() {
        let mut mgr = manager();
        let user = mgr.register(&harry()).unwrap();

        assert!(!user.id.is_empty());
        assert!(user.house.is_none());
        assert_eq!(mgr.current_user().unwrap().id, user.id);
        assert!(mgr.is_authenticated());
    }

    #[test]
    fn test_register_duplicate_email_leaves_store_unchanged() {
        let mut mgr = manager();
        mgr.register(&harry()).unwrap();

        let mut dup = harry();
        dup.username = "harry_two".to_string();

        assert_eq!(mgr.register(&dup), Err(AuthError::DuplicateEmail));
        assert_eq!(store::count_users(mgr_conn(&mgr)).unwrap(), 1);
    }

    #[test]
    fn test_register_duplicate_username() {
        let mut mgr = manager();
        mgr.register(&harry()).unwrap();

        let mut dup = harry();
        dup.email = "other@hogwarts.edu".to_string();

        assert_eq!(mgr.register(&dup), Err(AuthError::DuplicateUsername));
        assert_eq!(store::count_users(mgr_conn(&mgr)).unwrap(), 1);
    }

    #[test]
    fn test_login_after_register() {
        let mut mgr = manager();
        let registered = mgr.register(&harry()).unwrap();
        mgr.logout().unwrap();

        let user = mgr
            .login(&Credentials {
                email: "harry@hogwarts.edu".to_string(),
                password: "Expelliarmus1".to_string(),
            })
            .unwrap();

        assert_eq!(user.id, registered.id);
        assert!(mgr.is_authenticated());
    }

    #[test]
    fn test_login_rejects_bad_credentials() {
        let mut mgr = manager();
        mgr.register(&harry()).unwrap();
        mgr.logout().unwrap();

        let wrong_password = mgr.login(&Credentials {
            email: "harry@hogwarts.edu".to_string(),
            password: "Alohomora9".to_string(),
        });
        assert_eq!(wrong_password, Err(AuthError::InvalidCredentials));

        let unknown_email = mgr.login(&Credentials {
            email: "tom@hogwarts.edu".to_string(),
            password: "Expelliarmus1".to_string(),
        });
        assert_eq!(unknown_email, Err(AuthError::InvalidCredentials));
        assert!(!mgr.is_authenticated());
    }

    #[test]
    fn test_logout_idempotent() {
        let mut mgr = manager();
        mgr.register(&harry()).unwrap();

        mgr.logout().unwrap();
        assert!(mgr.current_user().is_none());

        // Logging out while logged out is a no-op
        mgr.logout().unwrap();
        assert!(mgr.current_user().is_none());
    }

    #[test]
    fn test_session_survives_reopen() {
        let conn = Connection::open_in_memory().unwrap();
        // In-memory connections don't survive a real reopen; exercise the
        // load path by rebuilding the manager around the same connection
        let mut mgr = SessionManager::new(conn).unwrap();
        let user = mgr.register(&harry()).unwrap();

        let conn = mgr.into_connection();
        let reopened = SessionManager::new(conn).unwrap();
        assert_eq!(reopened.current_user().unwrap().id, user.id);
    }

    #[test]
    fn test_update_user_house_refreshes_session() {
        let mut mgr = manager();
        let user = mgr.register(&harry()).unwrap();

        let updated = mgr.update_user_house(&user.id, House::Gryffindor).unwrap();
        assert_eq!(updated.house, Some(House::Gryffindor));
        assert_eq!(
            mgr.current_user().unwrap().house,
            Some(House::Gryffindor)
        );
    }

    #[test]
    fn test_update_user_house_unknown_id() {
        let mut mgr = manager();
        mgr.register(&harry()).unwrap();

        let result = mgr.update_user_house("no-such-id", House::Slytherin);
        assert!(matches!(result, Err(AuthError::UserNotFound(_))));

        // Signed-in user untouched
        assert!(mgr.current_user().unwrap().house.is_none());
    }

    #[test]
    fn test_validate_registration_accepts_good_input() {
        assert!(validate_registration(&harry()).is_ok());
    }

    #[test]
    fn test_validate_registration_username_rules() {
        let mut req = harry();
        req.username = "hp".to_string();
        let errors = validate_registration(&req).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "username"));

        req.username = "harry potter!".to_string();
        let errors = validate_registration(&req).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "username"));

        req.username = "a".repeat(21);
        let errors = validate_registration(&req).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "username"));
    }

    #[test]
    fn test_validate_registration_email_rules() {
        for bad in ["harry", "@hogwarts.edu", "harry@", "harry@hogwarts", "ha rry@h.e"] {
            let mut req = harry();
            req.email = bad.to_string();
            let errors = validate_registration(&req).unwrap_err();
            assert!(
                errors.iter().any(|e| e.field == "email"),
                "expected email error for {bad:?}"
            );
        }
    }

    #[test]
    fn test_validate_registration_password_rules() {
        for bad in ["Short1", "alllowercase1", "ALLUPPERCASE1", "NoDigitsHere"] {
            let mut req = harry();
            req.password = bad.to_string();
            let errors = validate_registration(&req).unwrap_err();
            assert!(
                errors.iter().any(|e| e.field == "password"),
                "expected password error for {bad:?}"
            );
        }
    }

    #[test]
    fn test_validation_collects_all_failing_fields() {
        let req = RegistrationRequest {
            username: "x".to_string(),
            email: "not-an-email".to_string(),
            password: "weak".to_string(),
        };
        let errors = validate_registration(&req).unwrap_err();

        assert!(errors.iter().any(|e| e.field == "username"));
        assert!(errors.iter().any(|e| e.field == "email"));
        assert!(errors.iter().any(|e| e.field == "password"));
    }

    // Test-only access to the underlying connection
    fn mgr_conn(mgr: &SessionManager) -> &Connection {
        &mgr.conn
    }
}
