//! # Document Rendering
//!
//! Turns computed report rows into printable byte streams.
//!
//! ## The Renderer Seam
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  price list rows ──┐                                                    │
//! │  receipt data ─────┼──► DocumentRenderer ──► Vec<u8> ──► printer/file   │
//! │  sales report ─────┤       (trait)                                      │
//! │  inventory report ─┘                                                    │
//! │                                                                         │
//! │  Core logic never touches a document library: it hands plain data       │
//! │  records across this trait. TextRenderer is the built-in plain-text     │
//! │  implementation; a PDF backend slots in behind the same trait.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The renderer owns currency formatting: whole units with dot thousands
//! separators and no decimals, and per-line tax-inclusive totals
//! (`qty × unit_cost × (1 + iva/100)`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::inventory::InventoryReport;
use crate::money::Money;
use crate::types::TaxRate;

// =============================================================================
// Row Types
// =============================================================================

/// One product's line on a price list / stock sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceListRow {
    pub code: Option<String>,
    pub name: String,
    /// Units on hand.
    pub qty: i64,
    pub unit_cost: Money,
    pub sale_price: Money,
    pub iva_bps: u32,
}

impl PriceListRow {
    /// Returns the IVA rate.
    #[inline]
    pub fn iva(&self) -> TaxRate {
        TaxRate::from_bps(self.iva_bps)
    }

    /// Tax-inclusive line total: `qty × unit_cost × (1 + iva/100)`.
    pub fn line_total_with_tax(&self) -> Money {
        self.unit_cost.times(self.qty).with_tax(self.iva())
    }
}

/// Everything a printed receipt needs for a single sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptData {
    pub business_name: String,
    pub product_name: String,
    pub qty: i64,
    /// Unit cost on record at the moment of sale.
    pub unit_cost: Money,
    /// Unit price charged.
    pub unit_price: Money,
    /// Amount charged: `round(price × qty, 2)`.
    pub total: Money,
    pub issued_at: DateTime<Utc>,
}

/// One sale's line on a detailed sales report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReportRow {
    pub product_name: String,
    pub units: i64,
    /// Unit cost on record for the product.
    pub unit_cost: Money,
    /// Unit price on record for the product.
    pub unit_price: Money,
    /// Recorded sale total.
    pub income: Money,
    pub sold_at: DateTime<Utc>,
}

impl SalesReportRow {
    /// Margin for the line: `(price − cost) × units`.
    pub fn profit(&self) -> Money {
        (self.unit_price - self.unit_cost).times(self.units)
    }
}

// =============================================================================
// Renderer Trait
// =============================================================================

/// Renders computed rows into a printable byte stream.
///
/// Implementations decide the medium (plain text, PDF, HTML); callers only
/// ever hand over plain data records.
pub trait DocumentRenderer {
    /// A price list / stock sheet with tax-inclusive line totals.
    fn render_price_list(&self, title: &str, rows: &[PriceListRow]) -> Vec<u8>;

    /// A receipt for one sale.
    fn render_receipt(&self, receipt: &ReceiptData) -> Vec<u8>;

    /// A detailed sales report with per-line profit.
    fn render_sales_report(&self, title: &str, rows: &[SalesReportRow]) -> Vec<u8>;

    /// An inventory valuation report, current vs. reconstructed cutoff.
    fn render_inventory(&self, report: &InventoryReport) -> Vec<u8>;
}

// =============================================================================
// Plain-Text Renderer
// =============================================================================

/// Fixed-width plain-text renderer, suitable for console output and
/// 80-column ticket printers.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    /// Prefix for currency amounts, e.g. `"$ "`.
    currency: String,
}

impl TextRenderer {
    pub fn new(currency: impl Into<String>) -> Self {
        TextRenderer {
            currency: currency.into(),
        }
    }

    /// Formats an amount in register style: `$ 12.000`.
    fn amount(&self, money: Money) -> String {
        format!("{}{}", self.currency, money.grouped())
    }

    /// Formats an IVA rate: `21%`, `10.5%`.
    fn iva(&self, rate: TaxRate) -> String {
        format!("{}%", rate.percentage())
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        TextRenderer::new("$ ")
    }
}

impl DocumentRenderer for TextRenderer {
    fn render_price_list(&self, title: &str, rows: &[PriceListRow]) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(title);
        out.push('\n');
        out.push_str(&"=".repeat(title.chars().count()));
        out.push('\n');
        out.push_str(&format!(
            "{:<10} {:<28} {:>6} {:>14} {:>14} {:>7} {:>16}\n",
            "CODE", "PRODUCT", "QTY", "UNIT COST", "PRICE", "IVA", "LINE TOTAL"
        ));
        for row in rows {
            out.push_str(&format!(
                "{:<10} {:<28} {:>6} {:>14} {:>14} {:>7} {:>16}\n",
                row.code.as_deref().unwrap_or("-"),
                row.name,
                row.qty,
                self.amount(row.unit_cost),
                self.amount(row.sale_price),
                self.iva(row.iva()),
                self.amount(row.line_total_with_tax()),
            ));
        }
        out.into_bytes()
    }

    fn render_receipt(&self, receipt: &ReceiptData) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(&receipt.business_name);
        out.push('\n');
        out.push_str(&format!(
            "{}\n",
            receipt.issued_at.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&"-".repeat(40));
        out.push('\n');
        out.push_str(&format!(
            "{} x {}  @ {}\n",
            receipt.qty,
            receipt.product_name,
            self.amount(receipt.unit_price),
        ));
        out.push_str(&"-".repeat(40));
        out.push('\n');
        out.push_str(&format!("TOTAL: {}\n", self.amount(receipt.total)));
        out.into_bytes()
    }

    fn render_sales_report(&self, title: &str, rows: &[SalesReportRow]) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(title);
        out.push('\n');
        out.push_str(&"=".repeat(title.chars().count()));
        out.push('\n');
        out.push_str(&format!(
            "{:<19} {:<28} {:>6} {:>12} {:>12} {:>14} {:>14}\n",
            "DATE", "PRODUCT", "UNITS", "COST", "PRICE", "INCOME", "PROFIT"
        ));
        let mut units = 0i64;
        let mut income = Money::zero();
        let mut profit = Money::zero();
        for row in rows {
            units += row.units;
            income += row.income;
            profit += row.profit();
            out.push_str(&format!(
                "{:<19} {:<28} {:>6} {:>12} {:>12} {:>14} {:>14}\n",
                row.sold_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                row.product_name,
                row.units,
                self.amount(row.unit_cost),
                self.amount(row.unit_price),
                self.amount(row.income),
                self.amount(row.profit()),
            ));
        }
        out.push_str(&format!(
            "\nTOTAL UNITS: {}   TOTAL INCOME: {}   TOTAL PROFIT: {}\n",
            units,
            self.amount(income),
            self.amount(profit),
        ));
        out.into_bytes()
    }

    fn render_inventory(&self, report: &InventoryReport) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(&format!(
            "INVENTORY AT {}\n\n",
            report.cutoff.format("%Y-%m-%d")
        ));
        out.push_str(&format!(
            "{:<10} {:<28} {:>8} {:>10} {:>16} {:>16}\n",
            "CODE", "PRODUCT", "NOW", "AT DATE", "COST VALUE", "SALE VALUE"
        ));
        for row in &report.rows {
            out.push_str(&format!(
                "{:<10} {:<28} {:>8} {:>10} {:>16} {:>16}\n",
                row.code.as_deref().unwrap_or("-"),
                row.name,
                row.stock_now,
                row.stock_at_cutoff,
                self.amount(row.cost_value_at_cutoff()),
                self.amount(row.sale_value_at_cutoff()),
            ));
        }
        out.push_str(&format!(
            "\nTOTALS AT DATE  cost: {}   sale: {}\n",
            self.amount(report.total_cost_value_at_cutoff()),
            self.amount(report.total_sale_value_at_cutoff()),
        ));
        out.push_str(&format!(
            "TOTALS NOW      cost: {}   sale: {}\n",
            self.amount(report.total_cost_value_now()),
            self.amount(report.total_sale_value_now()),
        ));
        out.push('\n');
        out.push_str(report.caveat());
        out.push('\n');
        out.into_bytes()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InventoryRow;

    fn render_to_string(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_line_total_with_tax() {
        let row = PriceListRow {
            code: Some("FER".into()),
            name: "Fernet 750".into(),
            qty: 3,
            unit_cost: Money::from_units(1000),
            sale_price: Money::from_units(1500),
            iva_bps: 2100,
        };
        // 3 × 1000 × 1.21 = 3630
        assert_eq!(row.line_total_with_tax(), Money::from_units(3630));
    }

    #[test]
    fn test_price_list_renders_grouped_amounts() {
        let renderer = TextRenderer::default();
        let rows = vec![PriceListRow {
            code: Some("FER".into()),
            name: "Fernet 750".into(),
            qty: 3,
            unit_cost: Money::from_units(1000),
            sale_price: Money::from_units(1500),
            iva_bps: 2100,
        }];
        let text = render_to_string(renderer.render_price_list("PRICE LIST", &rows));

        assert!(text.contains("PRICE LIST"));
        assert!(text.contains("Fernet 750"));
        assert!(text.contains("$ 1.000"));
        assert!(text.contains("21%"));
        assert!(text.contains("$ 3.630"));
    }

    #[test]
    fn test_iva_formatting_drops_trailing_zero() {
        let renderer = TextRenderer::default();
        assert_eq!(renderer.iva(TaxRate::from_bps(2100)), "21%");
        assert_eq!(renderer.iva(TaxRate::from_bps(1050)), "10.5%");
    }

    #[test]
    fn test_receipt_contains_business_and_total() {
        let renderer = TextRenderer::default();
        let receipt = ReceiptData {
            business_name: "Club Billar".into(),
            product_name: "Coca 1.5L".into(),
            qty: 2,
            unit_cost: Money::from_units(1200),
            unit_price: Money::from_units(2300),
            total: Money::from_units(4600),
            issued_at: Utc::now(),
        };
        let text = render_to_string(renderer.render_receipt(&receipt));

        assert!(text.starts_with("Club Billar"));
        assert!(text.contains("2 x Coca 1.5L"));
        assert!(text.contains("TOTAL: $ 4.600"));
    }

    #[test]
    fn test_sales_report_totals_income_and_profit() {
        let renderer = TextRenderer::default();
        let rows = vec![
            SalesReportRow {
                product_name: "Fernet 750".into(),
                units: 2,
                unit_cost: Money::from_units(6500),
                unit_price: Money::from_units(9000),
                income: Money::from_units(18_000),
                sold_at: Utc::now(),
            },
            SalesReportRow {
                product_name: "Coca 1.5L".into(),
                units: 1,
                unit_cost: Money::from_units(1200),
                unit_price: Money::from_units(2300),
                income: Money::from_units(2300),
                sold_at: Utc::now(),
            },
        ];
        // profits: (9000-6500)×2 = 5000, (2300-1200)×1 = 1100
        assert_eq!(rows[0].profit(), Money::from_units(5000));
        let text = render_to_string(renderer.render_sales_report("SALES", &rows));

        assert!(text.contains("TOTAL UNITS: 3"));
        assert!(text.contains("TOTAL INCOME: $ 20.300"));
        assert!(text.contains("TOTAL PROFIT: $ 6.100"));
    }

    #[test]
    fn test_inventory_render_discloses_caveat() {
        let renderer = TextRenderer::default();
        let report = InventoryReport {
            cutoff: Utc::now(),
            rows: vec![InventoryRow {
                code: None,
                name: "Fernet 750".into(),
                stock_now: 4,
                stock_at_cutoff: 6,
                cost: Money::from_units(6500),
                price: Money::from_units(9000),
            }],
        };
        let text = render_to_string(renderer.render_inventory(&report));

        assert!(text.contains("INVENTORY AT"));
        assert!(text.contains("$ 39.000")); // 6 × 6500 cost value at cutoff
        assert!(text.contains("invoice total")); // the reconstruction caveat
    }
}
