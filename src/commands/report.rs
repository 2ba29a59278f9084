use crate::args::{OutputFormat, ReportArgs};
use crate::commands::output::Table;
use crate::commands::{plural, Out, Rows};
use crate::error::{ErrorType, IntoResult};
use crate::ledger::Ledger;
use crate::report::{Filter, Report};
use crate::{Config, Result};

/// Totals by day and by category for the filtered expenses.
///
/// The table format prints the two tables one after the other. The CSV format puts both in one
/// table whose `Kind` column is `daily` or `category`.
pub async fn report(config: Config, args: ReportArgs) -> Result<Out<Rows>> {
    let ledger = Ledger::open(&config).await.pub_result(ErrorType::Storage)?;
    let expenses = ledger.expenses();
    let filter =
        Filter::new(args.filter.year, args.filter.month, args.filter.card).resolve(expenses);
    let report = Report::new(&filter, expenses);

    let rows = match args.format {
        OutputFormat::Table => {
            let mut daily = Table::new(["Date", "Total"]);
            for d in &report.daily {
                daily.push([d.date.to_string(), d.total.to_string()]);
            }
            let mut by_category = Table::new(["Category", "Total"]);
            for c in &report.by_category {
                by_category.push([c.category.to_string(), c.total.to_string()]);
            }
            Rows::Table(format!(
                "Daily totals\n\n{}\n\nBy category\n\n{}",
                daily.markdown(),
                by_category.markdown()
            ))
        }
        format => {
            let mut table = Table::new(["Kind", "Key", "Total"]);
            for d in &report.daily {
                table.push([
                    "daily".to_string(),
                    d.date.to_string(),
                    d.total.to_plain_string(),
                ]);
            }
            for c in &report.by_category {
                table.push([
                    "category".to_string(),
                    c.category.to_string(),
                    c.total.to_plain_string(),
                ]);
            }
            Rows::render(format, &table, &report).pub_result(ErrorType::Request)?
        }
    };

    let message = if report.count == 0 {
        format!(
            "No expenses for {}. Add expenses or pick another period to see totals.",
            report.period
        )
    } else {
        format!(
            "{}: {} totalling {}",
            report.period,
            plural(report.count, "expense", "expenses"),
            report.total
        )
    };
    Ok(Out::new(message, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::FilterArgs;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_report_table() {
        let env = TestEnv::new().await;
        env.insert_test_expenses().await;

        let args = ReportArgs {
            filter: FilterArgs {
                year: None,
                month: Some(1),
                card: None,
            },
            format: OutputFormat::Table,
        };
        let out = report(env.config(), args).await.unwrap();
        assert_eq!(
            out.message(),
            "2024 / January / All cards: 3 expenses totalling £63.60"
        );
        let Some(Rows::Table(table)) = out.structure() else {
            panic!("expected a table");
        };
        assert!(table.starts_with("Daily totals\n\n| Date       | Total  |"));
        assert!(table.contains("| 2024-01-03 | £54.10 |"));
        assert!(table.contains("| Transport     | £12.00 |"));
    }

    #[tokio::test]
    async fn test_report_csv() {
        let env = TestEnv::new().await;
        env.insert_test_expenses().await;

        let args = ReportArgs {
            filter: FilterArgs {
                year: Some(2023),
                month: None,
                card: None,
            },
            format: OutputFormat::Csv,
        };
        let out = report(env.config(), args).await.unwrap();
        let Some(Rows::Csv(csv)) = out.structure() else {
            panic!("expected csv");
        };
        assert_eq!(
            csv,
            "Kind,Key,Total\ndaily,2023-12-01,900.00\ncategory,Bills,900.00\n"
        );
    }

    #[tokio::test]
    async fn test_report_json_and_empty() {
        let env = TestEnv::new().await;
        let args = ReportArgs {
            format: OutputFormat::Json,
            ..Default::default()
        };
        let out = report(env.config(), args).await.unwrap();
        assert!(out.message().starts_with("No expenses for All years"));
        let Some(Rows::Json(json)) = out.structure() else {
            panic!("expected json");
        };
        assert_eq!(json["count"], 0);
        assert_eq!(json["total"], "0.00");
    }
}
