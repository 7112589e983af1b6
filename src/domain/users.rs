//! Account signup commands and field validation.

use serde::Deserialize;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 20;
const PASSWORD_MIN: usize = 8;
const EMAIL_MAX: usize = 100;
const NAME_MAX: usize = 100;
const DEPARTMENT_MAX: usize = 100;

/// Signup request body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub department: String,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let username_len = self.username.chars().count();
        if self.username.is_empty() {
            errors.push("Username is required".to_string());
        } else if !(USERNAME_MIN..=USERNAME_MAX).contains(&username_len) {
            errors.push(format!(
                "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
            ));
        } else if !self
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            errors.push("Username can only contain letters, numbers, and underscores".to_string());
        }

        if self.name.trim().is_empty() {
            errors.push("Name is required".to_string());
        } else if self.name.chars().count() > NAME_MAX {
            errors.push(format!("Name must be at most {NAME_MAX} characters"));
        }

        if self.email.is_empty() {
            errors.push("Email is required".to_string());
        } else if self.email.chars().count() > EMAIL_MAX {
            errors.push(format!("Email must be at most {EMAIL_MAX} characters"));
        } else if !email_shape_ok(&self.email) {
            errors.push("Invalid email format".to_string());
        }

        if self.password.is_empty() {
            errors.push("Password is required".to_string());
        } else if self.password.chars().count() < PASSWORD_MIN {
            errors.push(format!(
                "Password must be at least {PASSWORD_MIN} characters"
            ));
        }

        if self.department.trim().is_empty() {
            errors.push("Department is required".to_string());
        } else if self.department.chars().count() > DEPARTMENT_MAX {
            errors.push(format!(
                "Department must be at most {DEPARTMENT_MAX} characters"
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Credentials {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.username.is_empty() {
            errors.push("Username is required".to_string());
        }
        if self.password.is_empty() {
            errors.push("Password is required".to_string());
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Shallow shape check: one `@`, non-empty local part, dot in the domain.
fn email_shape_ok(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && !domain.is_empty() && domain.contains('.') && !domain.contains('@')
}
