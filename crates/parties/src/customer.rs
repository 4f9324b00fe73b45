use storefront_core::{CustomerId, DomainError, Entity};

use crate::address::Address;

/// Customer record referenced by orders (by id only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: CustomerId,
    name: String,
    address: Option<Address>,
    active: bool,
    reward_points: i64,
}

impl Customer {
    /// Create an inactive customer without an address.
    pub fn new(id: CustomerId, name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            id,
            name,
            address: None,
            active: false,
            reward_points: 0,
        })
    }

    /// Rebuild a customer from persisted state, re-checking every invariant.
    pub fn restore(
        id: CustomerId,
        name: impl Into<String>,
        address: Option<Address>,
        active: bool,
        reward_points: i64,
    ) -> Result<Self, DomainError> {
        let mut customer = Self::new(id, name)?;
        customer.address = address;
        if active {
            customer.activate()?;
        }
        customer.add_reward_points(reward_points)?;
        Ok(customer)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reward_points(&self) -> i64 {
        self.reward_points
    }

    pub fn change_name(&mut self, name: impl Into<String>) -> Result<(), DomainError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn change_address(&mut self, address: Address) {
        self.address = Some(address);
    }

    /// Only customers with an address on file may be activated.
    pub fn activate(&mut self) -> Result<(), DomainError> {
        if self.address.is_none() {
            return Err(DomainError::invariant(
                "address is mandatory to activate a customer",
            ));
        }
        self.active = true;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn add_reward_points(&mut self, points: i64) -> Result<(), DomainError> {
        if points < 0 {
            return Err(DomainError::validation("reward points must not be negative"));
        }
        self.reward_points = self
            .reward_points
            .checked_add(points)
            .ok_or_else(|| DomainError::validation("reward points overflow"))?;
        Ok(())
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("customer name is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_customer() -> Customer {
        Customer::new(CustomerId::parse("123").unwrap(), "Customer 1").unwrap()
    }

    fn test_address() -> Address {
        Address::new("Street 1", 123, "13330-250", "São Paulo").unwrap()
    }

    #[test]
    fn new_customer_starts_inactive_without_points() {
        let customer = test_customer();
        assert!(!customer.is_active());
        assert_eq!(customer.reward_points(), 0);
        assert!(customer.address().is_none());
    }

    #[test]
    fn new_rejects_blank_name() {
        let err = Customer::new(CustomerId::parse("123").unwrap(), "").unwrap_err();
        assert_eq!(err, DomainError::validation("customer name is required"));
    }

    #[test]
    fn activate_requires_address() {
        let mut customer = test_customer();
        let err = customer.activate().unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        customer.change_address(test_address());
        customer.activate().unwrap();
        assert!(customer.is_active());

        customer.deactivate();
        assert!(!customer.is_active());
    }

    #[test]
    fn reward_points_accumulate() {
        let mut customer = test_customer();
        customer.add_reward_points(10).unwrap();
        customer.add_reward_points(10).unwrap();
        assert_eq!(customer.reward_points(), 20);

        assert!(customer.add_reward_points(-1).is_err());
        assert_eq!(customer.reward_points(), 20);
    }

    #[test]
    fn restore_rejects_active_customer_without_address() {
        let err = Customer::restore(
            CustomerId::parse("123").unwrap(),
            "Customer 1",
            None,
            true,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }
}
