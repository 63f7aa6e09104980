use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{null_as_default, parse_end_time, pick_id, string_or_number_list};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawProduct")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub image: String,
    pub category: String,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: Option<u32>,
    pub is_flash_sale: bool,
    pub flash_sale_price: Option<f64>,
    pub sale_start_time: Option<DateTime<Utc>>,
    pub sale_end_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProduct {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    price: f64,
    #[serde(default)]
    original_price: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    category: String,
    #[serde(default, deserialize_with = "string_or_number_list")]
    sizes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    colors: Vec<String>,
    #[serde(default)]
    stock: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    is_flash_sale: bool,
    #[serde(default)]
    flash_sale_price: Option<f64>,
    #[serde(default, deserialize_with = "lossy_datetime")]
    sale_start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lossy_datetime")]
    sale_end_time: Option<DateTime<Utc>>,
}

/// A malformed sale date on one product must not fail a whole listing.
fn lossy_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .and_then(|raw| parse_end_time(raw.trim())))
}

impl TryFrom<RawProduct> for Product {
    type Error = String;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        Ok(Self {
            id: pick_id(raw.id, raw.mongo_id).ok_or("product without an id")?,
            name: raw.name,
            brand: raw.brand,
            price: raw.price,
            original_price: raw.original_price,
            image: raw.image,
            category: raw.category,
            sizes: raw.sizes,
            colors: raw.colors,
            stock: raw.stock,
            is_flash_sale: raw.is_flash_sale,
            flash_sale_price: raw.flash_sale_price.filter(|price| *price > 0.0),
            sale_start_time: raw.sale_start_time,
            sale_end_time: raw.sale_end_time,
        })
    }
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock.map_or(true, |stock| stock > 0)
    }

    /// Percentage off the original price, rounded down.
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price?;
        if original <= 0.0 || self.price >= original {
            return None;
        }
        Some((((original - self.price) / original) * 100.0).floor() as u32)
    }

    /// Flagged for the flash sale with a sale price and a complete sale window.
    pub fn is_flash_sale_item(&self) -> bool {
        self.is_flash_sale
            && self.flash_sale_price.is_some()
            && self.sale_start_time.is_some()
            && self.sale_end_time.is_some()
    }

    /// A flash-sale item whose window contains `now`.
    pub fn is_on_flash_sale(&self, now: DateTime<Utc>) -> bool {
        match (self.sale_start_time, self.sale_end_time) {
            (Some(start), Some(end)) => self.is_flash_sale_item() && start <= now && now < end,
            _ => false,
        }
    }

    /// The flash-sale price when one is set, otherwise the regular price.
    pub fn effective_price(&self) -> f64 {
        match self.flash_sale_price {
            Some(sale) if self.is_flash_sale => sale,
            _ => self.price,
        }
    }

    /// Percentage the flash-sale price takes off the regular price, rounded.
    pub fn flash_discount_percent(&self) -> Option<u32> {
        let sale = self.effective_price();
        if self.price <= 0.0 || sale >= self.price {
            return None;
        }
        Some(((1.0 - sale / self.price) * 100.0).round() as u32)
    }

    pub fn flash_savings(&self) -> f64 {
        (self.price - self.effective_price()).max(0.0)
    }
}

/// Orderings offered on the flash-sale page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlashSaleSort {
    #[default]
    Featured,
    EndingSoon,
    PriceLow,
    PriceHigh,
    Discount,
}

/// Flash-sale items out of `products`, ordered by `sort`. `Featured` keeps
/// the backend order.
pub fn flash_sale_products(products: &[Product], sort: FlashSaleSort) -> Vec<Product> {
    let mut items: Vec<Product> = products
        .iter()
        .filter(|product| product.is_flash_sale_item())
        .cloned()
        .collect();

    let discount = |p: &Product| {
        if p.price > 0.0 {
            (p.price - p.effective_price()) / p.price
        } else {
            0.0
        }
    };
    match sort {
        FlashSaleSort::Featured => {}
        FlashSaleSort::EndingSoon => items.sort_by_key(|p| p.sale_end_time),
        FlashSaleSort::PriceLow => {
            items.sort_by(|a, b| a.effective_price().total_cmp(&b.effective_price()))
        }
        FlashSaleSort::PriceHigh => {
            items.sort_by(|a, b| b.effective_price().total_cmp(&a.effective_price()))
        }
        FlashSaleSort::Discount => items.sort_by(|a, b| discount(b).total_cmp(&discount(a))),
    }
    items
}

/// What a shopper saves buying one of each flash-sale item.
pub fn total_flash_savings(products: &[Product]) -> f64 {
    products
        .iter()
        .filter(|product| product.is_flash_sale_item())
        .map(Product::flash_savings)
        .sum()
}

/// Query filters for `GET /api/products`. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilters {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ProductFilters {
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(category) = &self.category {
            query.push(("category".to_string(), category.clone()));
        }
        if let Some(brand) = &self.brand {
            query.push(("brand".to_string(), brand.clone()));
        }
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        if let Some(min) = self.min_price {
            query.push(("minPrice".to_string(), min.to_string()));
        }
        if let Some(max) = self.max_price {
            query.push(("maxPrice".to_string(), max.to_string()));
        }
        query
    }
}
