use serde::{Deserialize, Serialize};

/// Configuration for the users module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersConfig {
    /// Required number of digits in a student registration number.
    #[serde(default = "default_registration_number_digits")]
    pub registration_number_digits: usize,
    /// Minimum accepted password length.
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    /// Bootstrap administrator credentials; empty disables bootstrap.
    #[serde(default)]
    pub admin_email: String,
    #[serde(default)]
    pub admin_password: String,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            registration_number_digits: default_registration_number_digits(),
            min_password_length: default_min_password_length(),
            admin_email: String::new(),
            admin_password: String::new(),
        }
    }
}

fn default_registration_number_digits() -> usize {
    6
}

fn default_min_password_length() -> usize {
    8
}
