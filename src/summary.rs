use crate::amount::percentage_of;
use crate::config::AccountConfig;
use crate::error::CostReportError;
use crate::report::CostReport;
use bigdecimal::{BigDecimal, Zero};
use std::collections::BTreeMap;

/// Costs read from one account's latest report.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSpend {
    pub report_key: String,
    pub total: BigDecimal,
    pub services: BTreeMap<String, BigDecimal>,
}

impl AccountSpend {
    pub fn from_report(report_key: String, report: &CostReport) -> Result<Self, CostReportError> {
        let mut total = BigDecimal::zero();
        let mut services = BTreeMap::<String, BigDecimal>::new();
        for (service, amount) in report.service_amounts()? {
            total += &amount;
            *services.entry(service).or_insert_with(BigDecimal::zero) += amount;
        }
        Ok(AccountSpend {
            report_key,
            total,
            services,
        })
    }

    /// Largest nonzero services of this account, descending.
    pub fn top_services(&self, limit: usize) -> Vec<(&str, &BigDecimal)> {
        let mut services: Vec<(&str, &BigDecimal)> = self
            .services
            .iter()
            .filter(|(_, cost)| **cost > BigDecimal::zero())
            .map(|(service, cost)| (service.as_str(), cost))
            .collect();
        services.sort_by(|a, b| b.1.cmp(a.1));
        services.truncate(limit);
        services
    }
}

#[derive(Debug)]
pub enum AccountOutcome {
    Reported(AccountSpend),
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountCost {
    pub alias: String,
    pub total: BigDecimal,
    pub services: BTreeMap<String, BigDecimal>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedAccount {
    pub account_id: String,
    pub alias: String,
    pub cost: BigDecimal,
    pub percentage: BigDecimal,
}

impl RankedAccount {
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.alias, self.account_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedService {
    pub service: String,
    pub cost: BigDecimal,
    pub percentage: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub total_cost: BigDecimal,
    pub account_costs: BTreeMap<String, AccountCost>,
    pub service_costs: BTreeMap<String, BigDecimal>,
}

impl Default for AggregationResult {
    fn default() -> Self {
        AggregationResult {
            total_cost: BigDecimal::zero(),
            account_costs: BTreeMap::new(),
            service_costs: BTreeMap::new(),
        }
    }
}

impl AggregationResult {
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (&'a AccountConfig, AccountOutcome)>,
    {
        let mut result = outcomes
            .into_iter()
            .fold(AggregationResult::default(), |mut result, (account, outcome)| {
                result.record(account, outcome);
                result
            });
        result.total_cost = result
            .account_costs
            .values()
            .fold(BigDecimal::zero(), |total, account| total + &account.total);
        result
    }

    fn record(&mut self, account: &AccountConfig, outcome: AccountOutcome) {
        let cost = match outcome {
            AccountOutcome::Reported(spend) => {
                for (service, amount) in &spend.services {
                    *self
                        .service_costs
                        .entry(service.clone())
                        .or_insert_with(BigDecimal::zero) += amount;
                }
                AccountCost {
                    alias: account.alias.clone(),
                    total: spend.total,
                    services: spend.services,
                    error: None,
                }
            }
            AccountOutcome::Unavailable(reason) => AccountCost {
                alias: account.alias.clone(),
                total: BigDecimal::zero(),
                services: BTreeMap::new(),
                error: Some(reason),
            },
        };
        self.account_costs.insert(account.account_id.clone(), cost);
    }

    pub fn active_accounts(&self) -> usize {
        self.account_costs
            .values()
            .filter(|account| account.total > BigDecimal::zero())
            .count()
    }

    /// Accounts with a positive total, most expensive first.
    pub fn ranked_accounts(&self) -> Vec<RankedAccount> {
        let mut ranked: Vec<RankedAccount> = self
            .account_costs
            .iter()
            .filter(|(_, account)| account.total > BigDecimal::zero())
            .map(|(account_id, account)| RankedAccount {
                account_id: account_id.clone(),
                alias: account.alias.clone(),
                cost: account.total.clone(),
                percentage: percentage_of(&account.total, &self.total_cost),
            })
            .collect();
        ranked.sort_by(|a, b| b.cost.cmp(&a.cost));
        ranked
    }

    /// Up to `limit` services with a positive total, most expensive first.
    pub fn ranked_services(&self, limit: usize) -> Vec<RankedService> {
        let mut ranked: Vec<RankedService> = self
            .service_costs
            .iter()
            .filter(|(_, cost)| **cost > BigDecimal::zero())
            .map(|(service, cost)| RankedService {
                service: service.clone(),
                cost: cost.clone(),
                percentage: percentage_of(cost, &self.total_cost),
            })
            .collect();
        ranked.sort_by(|a, b| b.cost.cmp(&a.cost));
        ranked.truncate(limit);
        ranked
    }

    pub fn top_service(&self) -> Option<&str> {
        self.service_costs
            .iter()
            .max_by(|a, b| a.1.cmp(b.1))
            .map(|(service, _)| service.as_str())
    }
}
