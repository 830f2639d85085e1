//! Validated voter contact details.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid regex")
});

/// Number of digits in a phone number.
pub const PHONE_DIGITS: usize = 10;

/// An email address with a local part, a domain and an alphabetic TLD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl FromStr for Email {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if EMAIL_REGEX.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ContactError::Email)
        }
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// A phone number of exactly ten ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phone(String);

impl FromStr for Phone {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == PHONE_DIGITS && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(ContactError::Phone)
        }
    }
}

impl Display for Phone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("Invalid email address. Must contain '@' and a valid domain.")]
    Email,
    #[error("Phone number must be exactly 10 digits")]
    Phone,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_tld() {
        assert_eq!("foo@bar".parse::<Email>(), Err(ContactError::Email));
        assert_eq!(
            "foo@bar.com".parse::<Email>().unwrap().to_string(),
            "foo@bar.com"
        );
        assert!("first.last+tag@mail.example.org".parse::<Email>().is_ok());
        assert!("foo@bar.c".parse::<Email>().is_err());
        assert!("foo bar@baz.com".parse::<Email>().is_err());
        assert!("@bar.com".parse::<Email>().is_err());
    }

    #[test]
    fn phone_is_ten_digits() {
        assert!("0123456789".parse::<Phone>().is_ok());
        assert_eq!(
            " 0123456789 ".parse::<Phone>().unwrap().to_string(),
            "0123456789"
        );
        assert_eq!("012345678".parse::<Phone>(), Err(ContactError::Phone));
        assert_eq!("01234567890".parse::<Phone>(), Err(ContactError::Phone));
        assert_eq!("012345678a".parse::<Phone>(), Err(ContactError::Phone));
        assert_eq!("+123456789".parse::<Phone>(), Err(ContactError::Phone));
        // Non-ASCII digits are rejected.
        assert!("٠١٢٣٤٥٦٧٨٩".parse::<Phone>().is_err());
    }
}
