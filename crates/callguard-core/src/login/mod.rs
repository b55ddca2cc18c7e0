//! Phone-number login.
//!
//! A three-step wizard: the user enters a phone number, the client generates
//! a six-digit passcode and asks the backend to deliver it, the user types the
//! passcode back, and new users pick a display name. The passcode is checked
//! locally against the challenge the flow issued.

mod challenge;
mod flow;
mod validation;

pub use challenge::{DEFAULT_CODE_TTL, OtpChallenge};
pub use flow::{
    CodeRequest, Identity, LoginError, LoginFlow, LoginStep, NameRequest, VerifyOutcome,
    deliver_code, register_name,
};
pub use validation::{
    CODE_DIGITS, PHONE_DIGITS, ValidationError, normalize_phone_number, validate_code,
    validate_name, validate_phone_number,
};
