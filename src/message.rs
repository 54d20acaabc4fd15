use crate::amount::format_usd;
use crate::summary::{RankedAccount, RankedService};
use bigdecimal::BigDecimal;

/// Accounts and services listed in the summary email.
pub const NOTIFICATION_TOP_N: usize = 5;

pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// Everything the monthly summary email shows.
pub struct SummaryContent<'a> {
    pub month_label: &'a str,
    pub total_cost: &'a BigDecimal,
    pub active_accounts: usize,
    pub generated_at: &'a str,
    pub accounts: &'a [RankedAccount],
    pub services: &'a [RankedService],
}

impl Notification {
    pub fn summary(content: &SummaryContent) -> Self {
        let total = format_usd(content.total_cost);

        let account_lines = ranked_lines(content.accounts.iter().map(|account| {
            (&account.alias, &account.cost, &account.percentage)
        }));
        let service_lines = ranked_lines(content.services.iter().map(|service| {
            (&service.service, &service.cost, &service.percentage)
        }));

        let body = format!(
            "AWS Cost Report\n\
             \n\
             Reporting month: {month}\n\
             Total cost: {total}\n\
             Active accounts: {active}\n\
             Generated at: {generated_at}\n\
             \n\
             Cost by account (top {top_n}):{account_lines}\n\
             \n\
             Cost by service (top {top_n}):{service_lines}\n\
             \n\
             See the aggregator logs for the detailed report.",
            month = content.month_label,
            total = total,
            active = content.active_accounts,
            generated_at = content.generated_at,
            top_n = NOTIFICATION_TOP_N,
            account_lines = account_lines,
            service_lines = service_lines,
        );

        Notification {
            subject: format!("AWS Cost Report - {} (Total {})", content.month_label, total),
            body,
        }
    }

    pub fn failure(error: &str, attempted_at: &str, attempted_at_minute: &str) -> Self {
        Notification {
            subject: format!("AWS Cost Report Failed - {}", attempted_at_minute),
            body: format!(
                "AWS Cost Report generation failed\n\
                 \n\
                 Error: {}\n\
                 Attempted at: {}\n\
                 Check the aggregator logs for details.",
                error, attempted_at
            ),
        }
    }
}

/// `\n1. name: $cost (pct%)` for the first `NOTIFICATION_TOP_N` entries.
fn ranked_lines<'a, I>(entries: I) -> String
where
    I: Iterator<Item = (&'a String, &'a BigDecimal, &'a BigDecimal)>,
{
    entries
        .take(NOTIFICATION_TOP_N)
        .enumerate()
        .map(|(rank, (name, cost, percentage))| {
            format!("\n{}. {}: {} ({}%)", rank + 1, name, format_usd(cost), percentage)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::message::{Notification, SummaryContent};
    use crate::summary::{RankedAccount, RankedService};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn decimal(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    #[tokio::test]
    async fn test_summary() {
        let accounts = vec![
            RankedAccount {
                account_id: "111111111111".to_string(),
                alias: "storefront".to_string(),
                cost: decimal("1105.00"),
                percentage: decimal("95.7"),
            },
            RankedAccount {
                account_id: "222222222222".to_string(),
                alias: "analytics".to_string(),
                cost: decimal("50.00"),
                percentage: decimal("4.3"),
            },
        ];
        let services = vec![RankedService {
            service: "Amazon Elastic Compute Cloud - Compute".to_string(),
            cost: decimal("1155.00"),
            percentage: decimal("100.0"),
        }];

        let notification = Notification::summary(&SummaryContent {
            month_label: "2024-07",
            total_cost: &decimal("1155.00"),
            active_accounts: 2,
            generated_at: "2024-07-15 09:00:00 KST",
            accounts: &accounts,
            services: &services,
        });

        assert_eq!(
            notification.subject,
            "AWS Cost Report - 2024-07 (Total $1,155.00)"
        );
        assert!(notification.body.contains("Total cost: $1,155.00"));
        assert!(notification.body.contains("Active accounts: 2"));
        assert!(notification.body.contains("Generated at: 2024-07-15 09:00:00 KST"));
        assert!(notification
            .body
            .contains("Cost by account (top 5):\n1. storefront: $1,105.00 (95.7%)\n2. analytics: $50.00 (4.3%)"));
        assert!(notification.body.contains(
            "Cost by service (top 5):\n1. Amazon Elastic Compute Cloud - Compute: $1,155.00 (100.0%)"
        ));
    }

    #[tokio::test]
    async fn test_failure() {
        let notification =
            Notification::failure("access denied", "2024-07-15 09:00:00 KST", "2024-07-15 09:00");
        assert_eq!(notification.subject, "AWS Cost Report Failed - 2024-07-15 09:00");
        assert!(notification.body.contains("Error: access denied"));
        assert!(notification.body.contains("Attempted at: 2024-07-15 09:00:00 KST"));
    }
}
