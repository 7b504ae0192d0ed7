//! Query parameters and response wrappers
//!
//! Query parameter names are the Spanish ones published by the service
//! (`fecha_inicio`, `zona_id`, ...). Range checks run through `validator`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::ZoneId;
use domain_analytics::{RankingQuery, RiskLevel, SortOrder, TopClient};
use infra_cache::keys::DEFAULT_CLEAR_PATTERN;

use crate::error::ApiError;

/// `GET /analytics/payment-behavior`
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentBehaviorParams {
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub zona_id: Option<i64>,
}

impl PaymentBehaviorParams {
    pub fn zone(&self) -> Option<ZoneId> {
        self.zona_id.map(ZoneId::new)
    }
}

/// `DELETE /analytics/cache/clear`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheClearParams {
    pub pattern: Option<String>,
}

impl CacheClearParams {
    pub fn pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or(DEFAULT_CLEAR_PATTERN)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheClearResponse {
    pub message: String,
    pub keys_deleted: u64,
}

/// Optional zone filter shared by the annual analysis
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoneParams {
    pub zona_id: Option<i64>,
}

impl ZoneParams {
    pub fn zone(&self) -> Option<ZoneId> {
        self.zona_id.map(ZoneId::new)
    }
}

/// `GET /analytics/top-users`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TopUsersParams {
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    #[validate(range(min = 1, max = 1000, message = "must be between 1 and 1000"))]
    #[serde(default = "default_limit")]
    pub limite: usize,
    /// `mejor` or `peor`, defaults to `mejor`
    pub orden: Option<String>,
}

fn default_limit() -> usize {
    100
}

impl TopUsersParams {
    pub fn order(&self) -> Result<SortOrder, ApiError> {
        parse_order(self.orden.as_deref(), SortOrder::Best)
    }
}

/// Top clients of a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopClientsResponse {
    /// `{start} a {end}`
    pub period: String,
    pub order: SortOrder,
    pub total_clients: usize,
    pub clients: Vec<TopClient>,
}

/// `GET /analytics/global-ranking`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GlobalRankingParams {
    #[validate(range(min = 1, message = "must be at least 1"))]
    #[serde(default = "default_page")]
    pub pagina: u32,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    #[serde(default = "default_per_page")]
    pub por_pagina: u32,
    /// `mejor` or `peor`, defaults to `peor`
    pub orden: Option<String>,
    pub buscar: Option<String>,
    pub nivel_riesgo: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    50
}

impl GlobalRankingParams {
    /// Converts the parameters into a domain query
    pub fn to_query(&self) -> Result<RankingQuery, ApiError> {
        let risk_level = self
            .nivel_riesgo
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<RiskLevel>)
            .transpose()
            .map_err(ApiError::validation)?;

        Ok(RankingQuery {
            page: self.pagina,
            per_page: self.por_pagina,
            order: parse_order(self.orden.as_deref(), SortOrder::Worst)?,
            search: self
                .buscar
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            risk_level,
        })
    }
}

fn parse_order(raw: Option<&str>, default: SortOrder) -> Result<SortOrder, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value.parse().map_err(ApiError::validation),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(orden: Option<&str>, nivel_riesgo: Option<&str>) -> GlobalRankingParams {
        GlobalRankingParams {
            pagina: 1,
            por_pagina: 50,
            orden: orden.map(String::from),
            buscar: Some("  ".to_string()),
            nivel_riesgo: nivel_riesgo.map(String::from),
        }
    }

    #[test]
    fn test_ranking_defaults_and_parsing() {
        let query = ranking(None, Some("CRITICO")).to_query().unwrap();

        assert_eq!(query.order, SortOrder::Worst);
        assert_eq!(query.risk_level, Some(RiskLevel::Critical));
        assert_eq!(query.search, None);

        let query = ranking(Some("mejor"), None).to_query().unwrap();
        assert_eq!(query.order, SortOrder::Best);
    }

    #[test]
    fn test_search_is_trimmed() {
        let mut params = ranking(None, None);
        params.buscar = Some("  Mendoza ".to_string());

        assert_eq!(params.to_query().unwrap().search.as_deref(), Some("Mendoza"));
    }

    #[test]
    fn test_unknown_values_are_rejected() {
        assert!(matches!(
            ranking(Some("regular"), None).to_query(),
            Err(ApiError::Validation { .. })
        ));
        assert!(ranking(None, Some("EXTREMO")).to_query().is_err());
    }

    #[test]
    fn test_range_validation() {
        let mut params = ranking(None, None);
        params.por_pagina = 101;
        assert!(params.validate().is_err());

        params.por_pagina = 100;
        params.pagina = 0;
        assert!(params.validate().is_err());

        params.pagina = 3;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_cache_clear_default_pattern() {
        assert_eq!(CacheClearParams::default().pattern(), "metricas:*");
    }
}
