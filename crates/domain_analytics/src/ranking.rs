//! Client rankings by payment score
//!
//! Two flavours exist. Top clients rank the invoices issued in a date range;
//! the global ranking scores every active client over their whole history
//! using counters aggregated by the data source.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use core_kernel::{ClientId, ZoneId};

use crate::invoice::InvoiceAnalysis;
use crate::score::{round_to, ClientScore, PeriodCounts, RiskLevel};

/// Largest page size the global ranking serves
pub const MAX_PAGE_SIZE: u32 = 100;
/// Largest number of clients the top-clients report returns
pub const MAX_TOP_LIMIT: usize = 1000;

/// Ranking direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Highest score first
    #[serde(alias = "mejor")]
    Best,
    /// Lowest score first
    #[default]
    #[serde(alias = "peor")]
    Worst,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Best => "best",
            SortOrder::Worst => "worst",
        }
    }

    fn compare(&self, a: f64, b: f64) -> Ordering {
        let ascending = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        match self {
            SortOrder::Best => ascending.reverse(),
            SortOrder::Worst => ascending,
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "best" | "mejor" => Ok(SortOrder::Best),
            "worst" | "peor" => Ok(SortOrder::Worst),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Client ranked over invoices issued in a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopClient {
    pub client_id: ClientId,
    pub name: String,
    pub zone_id: ZoneId,
    pub total_invoices: u64,
    pub counts: PeriodCounts,
    #[serde(flatten)]
    pub score: ClientScore,
}

/// Scores each client's invoices and returns the first `limit` in `order`
pub fn top_clients(analyses: &[InvoiceAnalysis], limit: usize, order: SortOrder) -> Vec<TopClient> {
    let mut by_client: BTreeMap<ClientId, (String, ZoneId, PeriodCounts)> = BTreeMap::new();
    for analysis in analyses {
        let (_, _, counts) = by_client
            .entry(analysis.client_id)
            .or_insert_with(|| (analysis.client_name.clone(), analysis.zone_id, PeriodCounts::default()));
        counts.record(analysis.period());
    }

    let mut ranked: Vec<TopClient> = by_client
        .into_iter()
        .map(|(client_id, (name, zone_id, counts))| TopClient {
            client_id,
            name,
            zone_id,
            total_invoices: counts.total(),
            score: ClientScore::from_counts(&counts),
            counts,
        })
        .collect();

    ranked.sort_by(|a, b| order.compare(a.score.score, b.score.score).then(a.client_id.cmp(&b.client_id)));
    ranked.truncate(limit);
    ranked
}

/// Filter applied when the data source aggregates historical counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterFilter {
    /// Case-insensitive substring of the client name or national id
    pub search: Option<String>,
    /// Clients with fewer invoices are left out of the ranking
    pub min_invoices: u32,
}

/// Historical invoice counters for one client, as aggregated by the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientCounters {
    pub client_id: ClientId,
    pub name: String,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: String,
    pub counts: PeriodCounts,
    /// Mean days paid after the cutoff, unpaid and on-time invoices count as zero
    pub avg_days_past_cutoff: f64,
}

/// Client entry of the global ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedClient {
    pub client_id: ClientId,
    pub name: String,
    pub national_id: String,
    pub phone: String,
    pub email: String,
    pub status: String,
    pub score: f64,
    pub risk_level: RiskLevel,
    pub total_invoices: u64,
    pub punctual_invoices: u64,
    pub late_invoices: u64,
    pub avg_days_past_cutoff: f64,
}

impl From<ClientCounters> for RankedClient {
    fn from(c: ClientCounters) -> Self {
        let score = ClientScore::from_counts(&c.counts);
        Self {
            client_id: c.client_id,
            name: c.name,
            national_id: c.national_id.unwrap_or_else(|| "Unknown".to_string()),
            phone: c.phone.unwrap_or_else(|| "Unknown".to_string()),
            email: c.email.unwrap_or_else(|| "Unknown".to_string()),
            status: c.status,
            score: score.score,
            risk_level: score.risk_level,
            total_invoices: c.counts.total(),
            punctual_invoices: c.counts.optimal,
            late_invoices: c.counts.late(),
            avg_days_past_cutoff: round_to(c.avg_days_past_cutoff, 1),
        }
    }
}

/// Page request for the global ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingQuery {
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
    pub order: SortOrder,
    pub search: Option<String>,
    pub risk_level: Option<RiskLevel>,
}

impl Default for RankingQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 50,
            order: SortOrder::Worst,
            search: None,
            risk_level: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingFilters {
    pub search: Option<String>,
    pub risk_level: Option<RiskLevel>,
}

/// One page of the global ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingPage {
    pub page: u32,
    pub per_page: u32,
    pub total_clients: u64,
    pub total_pages: u64,
    pub order: SortOrder,
    pub filters: RankingFilters,
    pub clients: Vec<RankedClient>,
}

/// Scores, filters, sorts and paginates historical counters
pub fn rank_clients(counters: Vec<ClientCounters>, query: &RankingQuery) -> RankingPage {
    let page = query.page.max(1);
    let per_page = query.per_page.clamp(1, MAX_PAGE_SIZE);

    let mut ranked: Vec<RankedClient> = counters
        .into_iter()
        .map(RankedClient::from)
        .filter(|c| query.risk_level.map_or(true, |level| c.risk_level == level))
        .collect();
    sort_ranked(&mut ranked, query.order);

    let total_clients = ranked.len() as u64;
    let total_pages = total_clients.div_ceil(u64::from(per_page));
    let offset = (page as usize - 1).saturating_mul(per_page as usize);
    let clients = ranked.into_iter().skip(offset).take(per_page as usize).collect();

    RankingPage {
        page,
        per_page,
        total_clients,
        total_pages,
        order: query.order,
        filters: RankingFilters {
            search: query.search.clone(),
            risk_level: query.risk_level,
        },
        clients,
    }
}

fn sort_ranked(ranked: &mut [RankedClient], order: SortOrder) {
    ranked.sort_by(|a, b| order.compare(a.score, b.score).then(a.client_id.cmp(&b.client_id)));
}

/// Portfolio-wide figures over every ranked client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_clients: u64,
    pub by_risk_level: BTreeMap<RiskLevel, u64>,
    pub average_score: f64,
    pub total_invoices: u64,
    pub punctual_invoices: u64,
    pub late_invoices: u64,
}

impl GlobalStats {
    pub fn from_counters(counters: Vec<ClientCounters>) -> Self {
        let ranked: Vec<RankedClient> = counters.into_iter().map(RankedClient::from).collect();

        let mut by_risk_level: BTreeMap<RiskLevel, u64> =
            RiskLevel::ALL.iter().map(|level| (*level, 0)).collect();
        for client in &ranked {
            *by_risk_level.entry(client.risk_level).or_insert(0) += 1;
        }

        let total_clients = ranked.len() as u64;
        let average_score = if ranked.is_empty() {
            0.0
        } else {
            round_to(ranked.iter().map(|c| c.score).sum::<f64>() / ranked.len() as f64, 1)
        };

        Self {
            total_clients,
            by_risk_level,
            average_score,
            total_invoices: ranked.iter().map(|c| c.total_invoices).sum(),
            punctual_invoices: ranked.iter().map(|c| c.punctual_invoices).sum(),
            late_invoices: ranked.iter().map(|c| c.late_invoices).sum(),
        }
    }
}
