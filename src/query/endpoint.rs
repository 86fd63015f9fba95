use std::fmt;

/// Backend endpoints, relative to the API root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    Events,
    EventMetrics,
    Trends,
    MultiCompanyTrends,
    Metrics,
    Companies,
    EventTypes,
    CompanyAnalytics,
    EventDistribution,
    TopEvents,
    ActiveUsers,
    TopEndpoints,
    TopCompanies,
    Retention,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Events => "/events",
            Endpoint::EventMetrics => "/events/metrics",
            Endpoint::Trends => "/trends",
            Endpoint::MultiCompanyTrends => "/trends/multi-company",
            Endpoint::Metrics => "/metrics",
            Endpoint::Companies => "/companies",
            Endpoint::EventTypes => "/event-types",
            Endpoint::CompanyAnalytics => "/analytics/companies",
            Endpoint::EventDistribution => "/analytics/event-distribution",
            Endpoint::TopEvents => "/analytics/top-events",
            Endpoint::ActiveUsers => "/analytics/active-users",
            Endpoint::TopEndpoints => "/analytics/top-endpoints",
            Endpoint::TopCompanies => "/analytics/top-companies",
            Endpoint::Retention => "/analytics/retention",
        }
    }

    /// Message shown when a fetch against this endpoint fails.
    pub fn error_context(&self) -> &'static str {
        match self {
            Endpoint::Events => "Failed to fetch data",
            Endpoint::EventMetrics => "Failed to fetch metrics",
            Endpoint::Trends => "Failed to fetch trends data",
            Endpoint::MultiCompanyTrends => "Failed to fetch chart data",
            Endpoint::Metrics => "Failed to fetch dashboard data",
            Endpoint::Companies | Endpoint::CompanyAnalytics | Endpoint::TopCompanies => {
                "Failed to fetch companies data"
            }
            Endpoint::EventTypes | Endpoint::EventDistribution | Endpoint::TopEvents => {
                "Failed to fetch top events data"
            }
            Endpoint::ActiveUsers => "Failed to fetch active users data",
            Endpoint::TopEndpoints => "Failed to fetch endpoints data",
            Endpoint::Retention => "Failed to fetch retention data",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
