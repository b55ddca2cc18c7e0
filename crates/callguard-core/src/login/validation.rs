//! Login input validation.

/// Number of digits kept from a phone number.
pub const PHONE_DIGITS: usize = 10;

/// Number of digits in a one-time passcode.
pub const CODE_DIGITS: usize = 6;

/// Validation error for login input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Phone number has fewer than ten digits.
    InvalidPhoneNumber,
    /// Passcode is not exactly six digits.
    InvalidCode,
    /// Display name is empty.
    EmptyName,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::InvalidPhoneNumber => "Please enter a valid phone number",
            Self::InvalidCode => "Please enter a valid 6-digit OTP",
            Self::EmptyName => "Please enter your name",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Keep the digits of `input` and take the last ten.
///
/// Used for both typed input and device phone-number hints, so country
/// prefixes and punctuation fall away.
#[must_use]
pub fn normalize_phone_number(input: &str) -> String {
    let digits: Vec<char> = input.chars().filter(char::is_ascii_digit).collect();
    let start = digits.len().saturating_sub(PHONE_DIGITS);
    digits[start..].iter().collect()
}

/// Validate a phone number and return its normalised form.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPhoneNumber`] if the input has fewer
/// than ten digits.
pub fn validate_phone_number(input: &str) -> Result<String, ValidationError> {
    let normalized = normalize_phone_number(input);
    if normalized.len() < PHONE_DIGITS {
        return Err(ValidationError::InvalidPhoneNumber);
    }
    Ok(normalized)
}

/// Validate a passcode entry and return it trimmed.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidCode`] unless the trimmed input is
/// exactly six ASCII digits.
pub fn validate_code(input: &str) -> Result<&str, ValidationError> {
    let code = input.trim();
    if code.len() == CODE_DIGITS && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(code)
    } else {
        Err(ValidationError::InvalidCode)
    }
}

/// Validate a display name and return it trimmed.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] if the name is blank.
pub fn validate_name(input: &str) -> Result<&str, ValidationError> {
    let name = input.trim();
    if name.is_empty() {
        Err(ValidationError::EmptyName)
    } else {
        Ok(name)
    }
}
