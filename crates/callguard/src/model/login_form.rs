//! Login form state model.

use callguard_core::login::{CODE_DIGITS, PHONE_DIGITS, normalize_phone_number};

/// Text typed into the login wizard.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    /// Phone number field.
    pub phone: String,
    /// Passcode field.
    pub code: String,
    /// Display name field.
    pub name: String,
}

impl LoginForm {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the phone field, keeping the last ten digits.
    pub fn set_phone(&mut self, value: &str) {
        self.phone = normalize_phone_number(value);
    }

    /// Update the passcode field, keeping at most six digits.
    pub fn set_code(&mut self, value: &str) {
        self.code = digits(value, CODE_DIGITS);
    }

    /// Update the name field.
    pub fn set_name(&mut self, value: String) {
        self.name = value;
    }

    /// Whether the phone number is long enough to submit.
    #[must_use]
    pub fn phone_complete(&self) -> bool {
        self.phone.len() == PHONE_DIGITS
    }

    /// Whether the passcode is long enough to submit.
    #[must_use]
    pub fn code_complete(&self) -> bool {
        self.code.len() == CODE_DIGITS
    }
}

fn digits(value: &str, max: usize) -> String {
    value.chars().filter(char::is_ascii_digit).take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_keeps_last_ten_digits() {
        let mut form = LoginForm::new();
        form.set_phone("+91 98765-43210");
        assert_eq!(form.phone, "9876543210");
        assert!(form.phone_complete());

        form.set_phone("98765");
        assert_eq!(form.phone, "98765");
        assert!(!form.phone_complete());
    }

    #[test]
    fn code_drops_letters() {
        let mut form = LoginForm::new();
        form.set_code("12a34");
        assert_eq!(form.code, "1234");
        assert!(!form.code_complete());
    }
}
