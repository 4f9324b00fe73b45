use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, ValueObject};

/// Postal address of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    street: String,
    number: i64,
    zip: String,
    city: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        number: i64,
        zip: impl Into<String>,
        city: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let address = Self {
            street: street.into(),
            number,
            zip: zip.into(),
            city: city.into(),
        };
        address.validate()?;
        Ok(address)
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn zip(&self) -> &str {
        &self.zip
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [("street", &self.street), ("zip", &self.zip), ("city", &self.city)] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("address {field} is required")));
            }
        }
        if self.number <= 0 {
            return Err(DomainError::validation("address number must be positive"));
        }
        Ok(())
    }
}

impl ValueObject for Address {}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}, {}, {} {}", self.street, self.number, self.zip, self.city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_compare_by_value() {
        let a = Address::new("Street 1", 1, "13330-250", "São Paulo").unwrap();
        let b = Address::new("Street 1", 1, "13330-250", "São Paulo").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Street 1, 1, 13330-250 São Paulo");
    }

    #[test]
    fn blank_fields_are_rejected() {
        let err = Address::new("Street 1", 1, "", "São Paulo").unwrap_err();
        assert_eq!(err, DomainError::validation("address zip is required"));

        assert!(Address::new("Street 1", 0, "13330-250", "São Paulo").is_err());
    }
}
