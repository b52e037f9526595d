//! Shopping cart held in the visitor session.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;
use crate::query::adapt;
use crate::types::{Price, ProductId};

/// Largest quantity of one line.
pub const MAX_QUANTITY: u32 = 99;

/// Cart operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("{0} is out of stock")]
    OutOfStock(String),

    #[error("unknown variant {sku} for product {product}")]
    UnknownVariant { product: String, sku: String },

    #[error("quantity must be between 1 and {MAX_QUANTITY}")]
    InvalidQuantity,

    #[error("item not found in cart")]
    ItemNotFound,
}

/// A product snapshot taken when it was added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub slug: String,
    pub name: String,
    pub unit_price: Decimal,
    pub image: String,
    pub variant_sku: Option<String>,
    pub variant_label: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    #[must_use]
    pub fn line_total_display(&self) -> String {
        Price::usd(self.line_total()).display()
    }

    #[must_use]
    pub fn unit_price_display(&self) -> String {
        Price::usd(self.unit_price).display()
    }

    fn is_line(&self, product_id: ProductId, variant: Option<&str>) -> bool {
        self.product_id == product_id && self.variant_sku.as_deref() == variant
    }
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Add `quantity` of a product, merging with an existing line for the
    /// same product and variant. The merged quantity is capped at
    /// [`MAX_QUANTITY`].
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is zero, the product or variant is
    /// out of stock, or the variant SKU is unknown.
    pub fn add(
        &mut self,
        product: &Product,
        variant_sku: Option<&str>,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let display = adapt(product);
        if !display.is_purchasable() {
            return Err(CartError::OutOfStock(product.name.clone()));
        }

        let variant_sku = variant_sku.map(str::trim).filter(|s| !s.is_empty());
        let variant = match variant_sku {
            Some(sku) => {
                let variant = product.variant(sku).ok_or_else(|| CartError::UnknownVariant {
                    product: product.name.clone(),
                    sku: sku.to_string(),
                })?;
                if !variant.in_stock() {
                    return Err(CartError::OutOfStock(format!(
                        "{} ({})",
                        product.name,
                        variant.label()
                    )));
                }
                Some(variant)
            }
            None => None,
        };

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|item| item.is_line(product.id, variant_sku))
        {
            line.quantity = line.quantity.saturating_add(quantity).min(MAX_QUANTITY);
            return Ok(());
        }

        self.items.push(CartItem {
            product_id: product.id,
            slug: product.slug.clone(),
            name: product.name.clone(),
            unit_price: variant.and_then(|v| v.price).unwrap_or(product.price),
            image: display.image,
            variant_sku: variant.map(|v| v.sku.clone()),
            variant_label: variant.map(crate::catalog::Variant::label),
            quantity: quantity.min(MAX_QUANTITY),
        });
        Ok(())
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not in the cart or the quantity
    /// exceeds [`MAX_QUANTITY`].
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        variant_sku: Option<&str>,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(product_id, variant_sku);
        }
        if quantity > MAX_QUANTITY {
            return Err(CartError::InvalidQuantity);
        }

        let variant_sku = variant_sku.map(str::trim).filter(|s| !s.is_empty());
        let line = self
            .items
            .iter_mut()
            .find(|item| item.is_line(product_id, variant_sku))
            .ok_or(CartError::ItemNotFound)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the line is not in the cart.
    pub fn remove(
        &mut self,
        product_id: ProductId,
        variant_sku: Option<&str>,
    ) -> Result<(), CartError> {
        let variant_sku = variant_sku.map(str::trim).filter(|s| !s.is_empty());
        let before = self.items.len();
        self.items.retain(|item| !item.is_line(product_id, variant_sku));
        if self.items.len() == before {
            return Err(CartError::ItemNotFound);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn subtotal_display(&self) -> String {
        Price::usd(self.subtotal()).display()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
