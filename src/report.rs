//! Filtering and totals over the expenses collection.

use crate::model::{Amount, Card, Category, Expense};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Narrows the expenses by year, month and card.
///
/// A filter without a year uses the most recent year that has any expenses, which is what a
/// user looking at their spending usually wants.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Filter {
    year: Option<i32>,
    month: Option<u32>,
    card: Option<Card>,
}

impl Filter {
    pub fn new(year: Option<i32>, month: Option<u32>, card: Option<Card>) -> Self {
        Self { year, month, card }
    }

    /// Returns a filter that matches everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Fills in the default year from `expenses`. Returns `self` unchanged when a year is set
    /// or there are no expenses.
    pub fn resolve(self, expenses: &[Expense]) -> Self {
        Self {
            year: self.year.or_else(|| latest_year(expenses)),
            ..self
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn card(&self) -> Option<Card> {
        self.card
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        let date = expense.date();
        self.year.map_or(true, |y| date.year() == y)
            && self.month.map_or(true, |m| date.month() == m)
            && self.card.map_or(true, |c| expense.card() == c)
    }

    /// The matching expenses, sorted by date. Expenses on the same date keep file order.
    pub fn apply<'a>(&self, expenses: &'a [Expense]) -> Vec<&'a Expense> {
        let mut matched: Vec<&Expense> = expenses.iter().filter(|e| self.matches(e)).collect();
        matched.sort_by_key(|e| e.date());
        matched
    }

    /// A human description such as `2024 / March / All cards`.
    pub fn describe(&self) -> String {
        let year = self
            .year
            .map_or_else(|| "All years".to_string(), |y| y.to_string());
        let month = self
            .month
            .and_then(month_name)
            .unwrap_or("All months")
            .to_string();
        let card = self
            .card
            .map_or_else(|| "All cards".to_string(), |c| c.to_string());
        format!("{year} / {month} / {card}")
    }
}

/// The years that have expenses, ascending.
pub fn years(expenses: &[Expense]) -> Vec<i32> {
    let mut years: Vec<i32> = expenses.iter().map(|e| e.date().year()).collect();
    years.sort_unstable();
    years.dedup();
    years
}

fn latest_year(expenses: &[Expense]) -> Option<i32> {
    expenses.iter().map(|e| e.date().year()).max()
}

/// The cards that appear in `expenses`, sorted by name.
pub fn cards(expenses: &[Expense]) -> Vec<Card> {
    let mut cards: Vec<Card> = expenses.iter().map(Expense::card).collect();
    cards.sort_unstable_by_key(|c| c.to_string());
    cards.dedup();
    cards
}

pub fn month_name(month: u32) -> Option<&'static str> {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Totals for the expenses matched by a `Filter`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Report {
    pub period: String,
    pub count: usize,
    pub total: Amount,
    pub daily: Vec<DailyTotal>,
    pub by_category: Vec<CategoryTotal>,
    /// Every year that has expenses, whether or not the filter selected it.
    pub years: Vec<i32>,
    /// Every card that has expenses, whether or not the filter selected it.
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: Amount,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Amount,
}

impl Report {
    /// Builds the report for `filter`, which should already be resolved.
    pub fn new(filter: &Filter, expenses: &[Expense]) -> Self {
        let matched = filter.apply(expenses);

        let mut daily: BTreeMap<NaiveDate, Amount> = BTreeMap::new();
        let mut by_category: BTreeMap<Category, Amount> = BTreeMap::new();
        for e in &matched {
            let d = daily.entry(e.date()).or_default();
            *d = *d + e.amount();
            let c = by_category.entry(e.category()).or_default();
            *c = *c + e.amount();
        }

        Self {
            period: filter.describe(),
            count: matched.len(),
            total: matched.iter().map(|e| e.amount()).sum(),
            daily: daily
                .into_iter()
                .map(|(date, total)| DailyTotal { date, total })
                .collect(),
            by_category: by_category
                .into_iter()
                .map(|(category, total)| CategoryTotal { category, total })
                .collect(),
            years: years(expenses),
            cards: cards(expenses),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use std::str::FromStr;

    async fn expenses() -> Vec<Expense> {
        let env = TestEnv::new().await;
        env.insert_test_expenses().await;
        env.ledger().await.expenses().to_vec()
    }

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_default_year_is_latest() {
        let expenses = expenses().await;
        assert_eq!(years(&expenses), vec![2023, 2024]);
        let filter = Filter::all().resolve(&expenses);
        assert_eq!(filter.year(), Some(2024));
        assert_eq!(filter.apply(&expenses).len(), 5);

        let explicit = Filter::new(Some(2023), None, None).resolve(&expenses);
        assert_eq!(explicit.year(), Some(2023));
        assert_eq!(explicit.apply(&expenses).len(), 1);
    }

    #[tokio::test]
    async fn test_month_and_card() {
        let expenses = expenses().await;
        let filter = Filter::new(None, Some(1), Some(Card::Visa)).resolve(&expenses);
        let matched = filter.apply(&expenses);
        let descriptions: Vec<&str> = matched.iter().map(|e| e.description()).collect();
        assert_eq!(descriptions, vec!["Groceries", "Cinema"]);
        assert_eq!(filter.describe(), "2024 / January / Visa");
        assert_eq!(cards(&expenses), vec![Card::Amex, Card::Debit, Card::Visa]);
    }

    #[tokio::test]
    async fn test_report_totals() {
        let expenses = expenses().await;
        let filter = Filter::new(None, Some(1), None).resolve(&expenses);
        let report = Report::new(&filter, &expenses);
        assert_eq!(report.count, 3);
        assert_eq!(report.years, vec![2023, 2024]);
        assert_eq!(report.total, amount("63.60"));
        assert_eq!(
            report.daily,
            vec![
                DailyTotal {
                    date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                    total: amount("54.10"),
                },
                DailyTotal {
                    date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
                    total: amount("9.50"),
                },
            ]
        );
        let categories: Vec<(Category, Amount)> = report
            .by_category
            .iter()
            .map(|c| (c.category, c.total))
            .collect();
        assert_eq!(
            categories,
            vec![
                (Category::Food, amount("42.10")),
                (Category::Transport, amount("12.00")),
                (Category::Entertainment, amount("9.50")),
            ]
        );
    }

    #[test]
    fn test_empty() {
        let filter = Filter::all().resolve(&[]);
        assert_eq!(filter.year(), None);
        let report = Report::new(&filter, &[]);
        assert_eq!(report.count, 0);
        assert_eq!(report.total, Amount::ZERO);
        assert!(report.daily.is_empty());
        assert_eq!(report.period, "All years / All months / All cards");
    }

    #[test]
    fn test_cards_sorted_by_name() {
        let expense = |card| Expense {
            description: "x".to_string(),
            category: Category::Other,
            card,
            amount: amount("1"),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            id: Default::default(),
        };
        let expenses: Vec<Expense> = [Card::Unknown, Card::Cash, Card::Mastercard, Card::Cash]
            .into_iter()
            .map(expense)
            .collect();
        assert_eq!(
            cards(&expenses),
            vec![Card::Cash, Card::Mastercard, Card::Unknown]
        );
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }
}
