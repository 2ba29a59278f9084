use crate::args::SettleArgs;
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::ledger::Ledger;
use crate::undo::Settlement;
use crate::{utils, Config, Result};

/// Marks the owed items named in `args` as paid today. Unknown ids are rejected before anything
/// is written.
pub async fn settle(config: Config, args: SettleArgs) -> Result<Out<Vec<Settlement>>> {
    let mut ledger = Ledger::open(&config).await.pub_result(ErrorType::Storage)?;
    ledger
        .check_owed_ids(args.ids())
        .pub_result(ErrorType::Validation)?;

    let settlements = ledger
        .settle(args.ids(), utils::today())
        .await
        .pub_result(ErrorType::Storage)?;

    Ok(Out::new(
        format!(
            "Marked {} as paid and added {} to your expenses. Total owed is now {}",
            plural(settlements.len(), "item", "items"),
            plural(settlements.len(), "reimbursement", "reimbursements"),
            ledger.total_owed()
        ),
        settlements,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{Category, Record};
    use crate::test::TestEnv;

    const OWED: &str = "Who,Description,Card,Amount,Date,Id\n\
                        Alice,Dinner,Cash,20.00,2024-01-01,owe-1\n\
                        Bob,Taxi,Visa,7.00,2024-01-02,owe-2\n";

    #[tokio::test]
    async fn test_settle() {
        let env = TestEnv::new().await;
        env.write_owed_csv(OWED).await;

        let out = settle(env.config(), SettleArgs::new(["owe-2"]))
            .await
            .unwrap();
        assert_eq!(
            out.message(),
            "Marked 1 item as paid and added 1 reimbursement to your expenses. \
             Total owed is now £20.00"
        );
        let settlements = out.structure().unwrap();
        assert_eq!(settlements[0].owed.who(), "Bob");
        assert_eq!(settlements[0].reimbursement.date(), utils::today());

        let ledger = env.ledger().await;
        assert_eq!(ledger.owed().len(), 1);
        assert_eq!(ledger.expenses()[0].category(), Category::Reimbursement);
        assert_eq!(
            ledger.expenses()[0].id(),
            settlements[0].reimbursement.id()
        );
    }

    #[tokio::test]
    async fn test_settle_unknown_id() {
        let env = TestEnv::new().await;
        env.write_owed_csv(OWED).await;

        let e = settle(env.config(), SettleArgs::new(["owe-1", "owe-9"]))
            .await
            .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert!(e.to_string().contains("owe-9"));

        let ledger = env.ledger().await;
        assert_eq!(ledger.owed().len(), 2);
        assert!(ledger.expenses().is_empty());
    }
}
