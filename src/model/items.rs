//! Line items and priced item tables.

use super::Money;
use serde::{Deserialize, Serialize};

/// One row of a pricing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product or service name
    pub name: String,

    /// Quantity
    pub quantity: u32,

    /// Price per unit
    pub unit_price: Money,

    /// Independently supplied subtotal; computed when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_total: Option<Money>,
}

impl LineItem {
    /// Create a line item whose subtotal is computed.
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            line_total: None,
        }
    }

    /// Set an independently supplied subtotal and return self.
    pub fn with_line_total(mut self, total: Money) -> Self {
        self.line_total = Some(total);
        self
    }

    /// `quantity × unit_price`, saturating.
    pub fn computed_total(&self) -> Money {
        self.unit_price * self.quantity
    }

    /// `quantity × unit_price`, or `None` on overflow.
    pub fn checked_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }

    /// The subtotal shown in the table: the supplied one if any.
    pub fn line_total(&self) -> Money {
        self.line_total.unwrap_or_else(|| self.computed_total())
    }

    /// Whether a supplied subtotal agrees with `quantity × unit_price`.
    pub fn is_consistent(&self) -> bool {
        self.line_total
            .map_or(true, |total| total == self.computed_total())
    }
}

/// Where the table total is shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TotalPlacement {
    /// A trailing row, label spanning all but the last column
    Row {
        /// Label text
        #[serde(default = "default_row_label")]
        label: String,
    },
    /// A paragraph after the table: `<label> <amount>`
    Paragraph {
        /// Label text
        #[serde(default = "default_paragraph_label")]
        label: String,
    },
    /// No total
    None,
}

impl Default for TotalPlacement {
    fn default() -> Self {
        TotalPlacement::Row {
            label: default_row_label(),
        }
    }
}

fn default_row_label() -> String {
    "ИТОГО:".to_string()
}

fn default_paragraph_label() -> String {
    "Итого оборудование:".to_string()
}

/// An ordered list of line items with a derived total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTable {
    /// Column captions: name, quantity, unit price, subtotal
    #[serde(default = "default_columns")]
    pub columns: [String; 4],

    /// Line items in display order
    pub items: Vec<LineItem>,

    /// Total placement
    #[serde(default)]
    pub total: TotalPlacement,

    /// Suffix appended to formatted amounts (e.g. `" ₽"`)
    #[serde(default)]
    pub currency_suffix: Option<String>,

    /// Relative column widths
    #[serde(default = "default_widths")]
    pub column_widths: [f32; 4],
}

fn default_columns() -> [String; 4] {
    [
        "Наименование".to_string(),
        "Кол-во".to_string(),
        "Цена за ед. (₽)".to_string(),
        "Сумма (₽)".to_string(),
    ]
}

fn default_widths() -> [f32; 4] {
    [90.0, 20.0, 40.0, 40.0]
}

impl ItemTable {
    /// Create a table with default captions and a total row.
    pub fn new(items: Vec<LineItem>) -> Self {
        Self {
            columns: default_columns(),
            items,
            total: TotalPlacement::default(),
            currency_suffix: None,
            column_widths: default_widths(),
        }
    }

    /// Set the total placement and return self.
    pub fn with_total(mut self, total: TotalPlacement) -> Self {
        self.total = total;
        self
    }

    /// Set the currency suffix and return self.
    pub fn with_currency_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.currency_suffix = Some(suffix.into());
        self
    }

    /// Sum of the displayed line totals.
    pub fn total(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Remove every item matching `pred`; the total follows automatically.
    pub fn remove_items(&mut self, pred: impl Fn(&LineItem) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !pred(item));
        before - self.items.len()
    }

    /// Format an amount with the configured suffix.
    pub fn format_amount(&self, amount: Money) -> String {
        match &self.currency_suffix {
            Some(suffix) => format!("{}{}", amount.format_grouped(), suffix),
            None => amount.format_grouped(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hardware() -> ItemTable {
        ItemTable::new(vec![
            LineItem::new("Сервер YADRO G4208P G3", 1, Money::from_major(32_151_159)),
            LineItem::new("Коммутатор Eltex MES2300-24", 1, Money::from_major(139_000)),
            LineItem::new("ИБП Ippon Innova RT 3000", 1, Money::from_major(120_000)),
            LineItem::new("Шкаф телекоммуникационный 42U", 1, Money::from_major(85_000)),
            LineItem::new("Комплект кабелей", 1, Money::from_major(50_000)),
        ])
    }

    #[test]
    fn test_total_is_sum_of_line_totals() {
        assert_eq!(hardware().total(), Money::from_major(32_545_159));
    }

    #[test]
    fn test_supplied_line_total_wins() {
        let item = LineItem::new("Switch MES5324", 2, Money::from_major(499_000))
            .with_line_total(Money::from_major(499_000));
        assert!(!item.is_consistent());
        assert_eq!(item.line_total(), Money::from_major(499_000));
        assert_eq!(item.computed_total(), Money::from_major(998_000));
    }

    #[test]
    fn test_total_follows_removal() {
        let mut table = hardware();
        let removed = table.remove_items(|i| i.name.contains("ИБП"));
        assert_eq!(removed, 1);
        assert_eq!(table.total(), Money::from_major(32_425_159));
    }

    #[test]
    fn test_format_amount_suffix() {
        let table = hardware().with_currency_suffix(" ₽");
        assert_eq!(table.format_amount(Money::from_major(120_000)), "120 000 ₽");
    }

    #[test]
    fn test_deserialize_from_toml() {
        let table: ItemTable = toml::from_str(
            r#"
            currency_suffix = " ₽"
            total = { kind = "paragraph" }

            [[items]]
            name = "ОС Альт Линукс СПТ"
            quantity = 2
            unit_price = 15000
            "#,
        )
        .unwrap();
        assert_eq!(table.columns[1], "Кол-во");
        assert_eq!(table.total(), Money::from_major(30_000));
        assert_eq!(
            table.total,
            TotalPlacement::Paragraph {
                label: "Итого оборудование:".to_string()
            }
        );
    }
}
