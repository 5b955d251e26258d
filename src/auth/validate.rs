//! Form field checks. Messages are collected in field order and shown
//! above the form that produced them.

const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Default)]
pub struct FormErrors(Vec<String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Non-blank, at most `max_len` characters after trimming.
    pub fn required(&mut self, label: &str, value: &str, max_len: usize) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(format!("{label} is required"));
        } else {
            self.max_len(label, trimmed, max_len);
        }
    }

    /// May be blank; otherwise at most `max_len` characters.
    pub fn optional(&mut self, label: &str, value: &str, max_len: usize) {
        self.max_len(label, value.trim(), max_len);
    }

    /// Blank is accepted; anything else must look like an address.
    pub fn email(&mut self, value: &str) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }
        if trimmed.len() > MAX_EMAIL_LEN {
            self.push(format!("Email must be at most {MAX_EMAIL_LEN} characters"));
        } else if !trimmed.contains('@') || !trimmed.contains('.') {
            self.push("Email must be a valid address (contain '@' and '.')");
        }
    }

    pub fn new_password(&mut self, value: &str) {
        if value.is_empty() {
            self.push("New password is required");
        } else if value.chars().count() < MIN_PASSWORD_LEN {
            self.push(format!("New password must be at least {MIN_PASSWORD_LEN} characters"));
        }
    }

    fn max_len(&mut self, label: &str, value: &str, max_len: usize) {
        if value.chars().count() > max_len {
            self.push(format!("{label} must be at most {max_len} characters"));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(value)` when nothing was reported.
    pub fn finish<T>(self, value: T) -> Result<T, Vec<String>> {
        if self.0.is_empty() { Ok(value) } else { Err(self.0) }
    }
}
