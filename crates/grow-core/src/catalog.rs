//! Products, coaches, carts and purchases.
//!
//! Layout:
//!   .grow/catalog.yaml          products and coaches (seeded by `grow init`)
//!   .grow/carts/{user_id}.yaml  one cart per signed-in user
//!   .grow/purchases.yaml        checked-out carts, IDs P1, P2, …
//!
//! No payment is taken: checkout only records what was bought.

use crate::error::{GrowError, Result};
use crate::{io, paths};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_CATALOG: &str = include_str!("../catalog/default.yaml");
const MAX_QUANTITY: u32 = 99;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub slug: String,
    pub name: String,
    pub category: String,
    pub price_cents: u64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coach {
    pub slug: String,
    pub name: String,
    pub headline: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub bio: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub coaches: Vec<Coach>,
}

impl Catalog {
    pub fn builtin() -> Result<Self> {
        let catalog: Self = serde_yaml::from_str(DEFAULT_CATALOG)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// The project catalog, or the bundled one when none has been written.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::catalog_path(root);
        if !path.exists() {
            return Self::builtin();
        }
        let data = std::fs::read_to_string(&path)?;
        let catalog: Self = serde_yaml::from_str(&data)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Write the bundled catalog unless the project already has one.
    pub fn seed(root: &Path) -> Result<bool> {
        io::write_if_missing(&paths::catalog_path(root), DEFAULT_CATALOG.as_bytes())
    }

    pub fn validate(&self) -> Result<()> {
        for p in &self.products {
            paths::validate_slug(&p.slug)?;
        }
        for c in &self.coaches {
            paths::validate_slug(&c.slug)?;
        }
        Ok(())
    }

    pub fn product(&self, slug: &str) -> Result<&Product> {
        self.products
            .iter()
            .find(|p| p.slug == slug)
            .ok_or_else(|| GrowError::ProductNotFound(slug.to_string()))
    }

    pub fn coach(&self, slug: &str) -> Result<&Coach> {
        self.coaches
            .iter()
            .find(|c| c.slug == slug)
            .ok_or_else(|| GrowError::CoachNotFound(slug.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn load(root: &Path, user_id: &str) -> Result<Self> {
        io::read_yaml_or_default(&paths::cart_path(root, user_id))
    }

    pub fn save(&self, root: &Path, user_id: &str) -> Result<()> {
        io::write_yaml(&paths::cart_path(root, user_id), self)
    }

    /// Add `quantity` of a product, merging with an existing line.
    pub fn add(&mut self, product: &str, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(GrowError::field("quantity", "must be at least 1"));
        }
        match self.items.iter_mut().find(|i| i.product == product) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(quantity).min(MAX_QUANTITY)
            }
            None => self.items.push(CartItem {
                product: product.to_string(),
                quantity: quantity.min(MAX_QUANTITY),
            }),
        }
        Ok(())
    }

    /// Drop a product line. Returns `false` if it was not in the cart.
    pub fn remove(&mut self, product: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product != product);
        self.items.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Price every line against `catalog`.
    pub fn priced(&self, catalog: &Catalog) -> Result<PricedCart> {
        let mut lines = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let p = catalog.product(&item.product)?;
            lines.push(CartLine {
                product: p.slug.clone(),
                name: p.name.clone(),
                quantity: item.quantity,
                unit_price_cents: p.price_cents,
                line_total_cents: p.price_cents * u64::from(item.quantity),
            });
        }
        let total_cents = lines.iter().map(|l| l.line_total_cents).sum();
        Ok(PricedCart { lines, total_cents })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: u64,
    pub line_total_cents: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedCart {
    pub lines: Vec<CartLine>,
    pub total_cents: u64,
}

/// Add a catalog product to a user's cart and return the priced result.
pub fn add_to_cart(root: &Path, user_id: &str, slug: &str, quantity: u32) -> Result<PricedCart> {
    let catalog = Catalog::load(root)?;
    catalog.product(slug)?;
    let mut cart = Cart::load(root, user_id)?;
    cart.add(slug, quantity)?;
    cart.save(root, user_id)?;
    cart.priced(&catalog)
}

pub fn remove_from_cart(root: &Path, user_id: &str, slug: &str) -> Result<PricedCart> {
    let catalog = Catalog::load(root)?;
    let mut cart = Cart::load(root, user_id)?;
    if !cart.remove(slug) {
        return Err(GrowError::ProductNotFound(slug.to_string()));
    }
    cart.save(root, user_id)?;
    cart.priced(&catalog)
}

pub fn view_cart(root: &Path, user_id: &str) -> Result<PricedCart> {
    Cart::load(root, user_id)?.priced(&Catalog::load(root)?)
}

// ---------------------------------------------------------------------------
// Purchases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: String,
    pub user_id: String,
    pub lines: Vec<CartLine>,
    pub total_cents: u64,
    pub created_at: DateTime<Utc>,
}

fn load_purchases(root: &Path) -> Result<Vec<Purchase>> {
    io::read_yaml_or_default(&paths::purchases_path(root))
}

fn next_purchase_id(purchases: &[Purchase]) -> String {
    let max = purchases
        .iter()
        .filter_map(|p| p.id.strip_prefix('P')?.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    format!("P{}", max + 1)
}

/// Record the user's cart as a purchase at current prices and empty it.
pub fn checkout(root: &Path, user_id: &str) -> Result<Purchase> {
    let catalog = Catalog::load(root)?;
    let mut cart = Cart::load(root, user_id)?;
    if cart.is_empty() {
        return Err(GrowError::EmptyCart);
    }
    let priced = cart.priced(&catalog)?;
    let mut purchases = load_purchases(root)?;
    let purchase = Purchase {
        id: next_purchase_id(&purchases),
        user_id: user_id.to_string(),
        lines: priced.lines,
        total_cents: priced.total_cents,
        created_at: Utc::now(),
    };
    purchases.push(purchase.clone());
    io::write_yaml(&paths::purchases_path(root), &purchases)?;

    cart.items.clear();
    cart.save(root, user_id)?;
    tracing::info!(id = %purchase.id, user = %user_id, total = purchase.total_cents, "checkout");
    Ok(purchase)
}

pub fn purchases_for(root: &Path, user_id: &str) -> Result<Vec<Purchase>> {
    let mut all = load_purchases(root)?;
    all.retain(|p| p.user_id == user_id);
    Ok(all)
}

/// Distinct products a user owns, in order of first purchase. Products
/// since removed from the catalog are skipped.
pub fn user_products(root: &Path, user_id: &str) -> Result<Vec<Product>> {
    let catalog = Catalog::load(root)?;
    let mut out: Vec<Product> = Vec::new();
    for purchase in purchases_for(root, user_id)? {
        for line in purchase.lines {
            if out.iter().any(|p| p.slug == line.product) {
                continue;
            }
            if let Ok(p) = catalog.product(&line.product) {
                out.push(p.clone());
            }
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn dir() -> tempfile::TempDir {
        let d = tempfile::TempDir::new().unwrap();
        Catalog::seed(d.path()).unwrap();
        d
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let c = Catalog::builtin().unwrap();
        assert!(!c.products.is_empty());
        assert!(!c.coaches.is_empty());
        assert_eq!(c.product("growth-playbook").unwrap().price_cents, 2900);
        assert!(matches!(
            c.coach("nobody"),
            Err(GrowError::CoachNotFound(_))
        ));
    }

    #[test]
    fn seed_does_not_overwrite() {
        let d = dir();
        std::fs::write(paths::catalog_path(d.path()), "products: []\ncoaches: []\n").unwrap();
        assert!(!Catalog::seed(d.path()).unwrap());
        assert!(Catalog::load(d.path()).unwrap().products.is_empty());
    }

    #[test]
    fn cart_totals() {
        let d = dir();
        add_to_cart(d.path(), "u1", "growth-playbook", 2).unwrap();
        let cart = add_to_cart(d.path(), "u1", "career-clarity-session", 1).unwrap();
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.lines[0].line_total_cents, 5800);
        assert_eq!(cart.total_cents, 5800 + 14900);

        let cart = add_to_cart(d.path(), "u1", "growth-playbook", 1).unwrap();
        assert_eq!(cart.lines[0].quantity, 3);
        assert_eq!(cart.total_cents, 3 * 2900 + 14900);
    }

    #[test]
    fn huge_quantity_is_capped() {
        let d = dir();
        add_to_cart(d.path(), "u1", "growth-playbook", 1).unwrap();
        let cart = add_to_cart(d.path(), "u1", "growth-playbook", u32::MAX).unwrap();
        assert_eq!(cart.lines[0].quantity, MAX_QUANTITY);
        assert_eq!(cart.total_cents, u64::from(MAX_QUANTITY) * 2900);
    }

    #[test]
    fn carts_are_per_user() {
        let d = dir();
        add_to_cart(d.path(), "u1", "growth-playbook", 1).unwrap();
        assert!(view_cart(d.path(), "u2").unwrap().lines.is_empty());
    }

    #[test]
    fn unknown_product_rejected() {
        let d = dir();
        assert!(matches!(
            add_to_cart(d.path(), "u1", "nope", 1),
            Err(GrowError::ProductNotFound(_))
        ));
        assert!(add_to_cart(d.path(), "u1", "growth-playbook", 0).is_err());
    }

    #[test]
    fn remove_line() {
        let d = dir();
        add_to_cart(d.path(), "u1", "growth-playbook", 1).unwrap();
        let cart = remove_from_cart(d.path(), "u1", "growth-playbook").unwrap();
        assert_eq!(cart.total_cents, 0);
        assert!(remove_from_cart(d.path(), "u1", "growth-playbook").is_err());
    }

    #[test]
    fn checkout_records_and_empties() {
        let d = dir();
        assert!(matches!(checkout(d.path(), "u1"), Err(GrowError::EmptyCart)));

        add_to_cart(d.path(), "u1", "growth-playbook", 1).unwrap();
        add_to_cart(d.path(), "u1", "digital-twin-program", 1).unwrap();
        let p = checkout(d.path(), "u1").unwrap();
        assert_eq!(p.id, "P1");
        assert_eq!(p.total_cents, 2900 + 49900);
        assert!(view_cart(d.path(), "u1").unwrap().lines.is_empty());

        add_to_cart(d.path(), "u1", "growth-playbook", 1).unwrap();
        assert_eq!(checkout(d.path(), "u1").unwrap().id, "P2");

        let owned = user_products(d.path(), "u1").unwrap();
        let slugs: Vec<&str> = owned.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["growth-playbook", "digital-twin-program"]);
        assert!(user_products(d.path(), "u2").unwrap().is_empty());
    }
}
