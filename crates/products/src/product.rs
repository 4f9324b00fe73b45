use storefront_core::{DomainError, Entity, ProductId};

/// Catalog product.
///
/// Orders never hold a `Product`; they copy its name and price into an order
/// item when the item is built, so later price changes do not touch existing
/// orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    /// Price in smallest currency unit (e.g., cents).
    price: i64,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: i64) -> Result<Self, DomainError> {
        let name = name.into();
        validate_name(&name)?;
        validate_price(price)?;
        Ok(Self { id, name, price })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn change_name(&mut self, name: impl Into<String>) -> Result<(), DomainError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn change_price(&mut self, price: i64) -> Result<(), DomainError> {
        validate_price(price)?;
        self.price = price;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("product name is required"));
    }
    Ok(())
}

fn validate_price(price: i64) -> Result<(), DomainError> {
    if price < 0 {
        return Err(DomainError::validation("product price must not be negative"));
    }
    Ok(())
}

/// Stateless operations over many products.
pub struct ProductService;

impl ProductService {
    /// Raise every price by `percentage` percent, rounding half up.
    ///
    /// Either every product is repriced or none is.
    pub fn increase_price(products: &mut [Product], percentage: i64) -> Result<(), DomainError> {
        let repriced = products
            .iter()
            .map(|p| scaled_price(p.price, percentage))
            .collect::<Result<Vec<_>, _>>()?;

        for (product, price) in products.iter_mut().zip(repriced) {
            product.price = price;
        }
        Ok(())
    }
}

fn scaled_price(price: i64, percentage: i64) -> Result<i64, DomainError> {
    let factor = i128::from(percentage) + 100;
    if factor < 0 {
        return Err(DomainError::validation(format!(
            "percentage {percentage} would make prices negative"
        )));
    }
    let scaled = (i128::from(price) * factor + 50) / 100;
    i64::try_from(scaled)
        .map_err(|_| DomainError::validation(format!("price overflow applying {percentage}%")))
}
