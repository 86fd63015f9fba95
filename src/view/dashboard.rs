use serde::Serialize;

use crate::{
    client::{AnalyticsService, QueryState},
    models::{
        CompanyActivity, EndpointActivity, EventTypeCount, ListResponse, MetricsResponse,
        TimeSeriesResponse, UserActivity,
    },
    query::{QueryInput, Timeframe},
};

/// Everything the overview page shows, loaded in one go.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub metrics: Option<MetricsResponse>,
    pub trends: Option<TimeSeriesResponse>,
    pub top_events: Vec<EventTypeCount>,
    pub active_users: Vec<UserActivity>,
    pub top_endpoints: Vec<EndpointActivity>,
    pub top_companies: Vec<CompanyActivity>,
    pub loading: bool,
    /// First error among the panels, in display order.
    pub error: Option<String>,
    /// Every panel error, in display order.
    pub errors: Vec<String>,
}

/// Fetch every overview panel concurrently.
///
/// A failing panel leaves its slot empty; the others still load.
pub async fn load_dashboard(service: &AnalyticsService, input: &QueryInput) -> DashboardSnapshot {
    let builder = service.builder();
    let filters = builder.filters(input);
    let trends = builder.trends(input, Some(Timeframe::Daily), &[]);
    let leaderboard = builder.leaderboard(input, None);

    let (metrics, trends, top_events, active_users, top_endpoints, top_companies) = futures::join!(
        service.metrics(&filters),
        service.trends(&trends),
        service.top_events(&leaderboard),
        service.active_users(&leaderboard),
        service.top_endpoints(&leaderboard),
        service.top_companies(&leaderboard),
    );

    let mut folded = Fold::default();
    let metrics = folded.take(metrics);
    let trends = folded.take(trends);
    let top_events = folded.list(top_events);
    let active_users = folded.list(active_users);
    let top_endpoints = folded.list(top_endpoints);
    let top_companies = folded.list(top_companies);

    DashboardSnapshot {
        metrics,
        trends,
        top_events,
        active_users,
        top_endpoints,
        top_companies,
        loading: folded.loading,
        error: folded.errors.first().cloned(),
        errors: folded.errors,
    }
}

#[derive(Default)]
struct Fold {
    loading: bool,
    errors: Vec<String>,
}

impl Fold {
    fn take<T>(&mut self, state: QueryState<T>) -> Option<T> {
        self.loading |= state.loading;
        if let Some(error) = state.error {
            self.errors.push(error);
        }
        state.data
    }

    fn list<T>(&mut self, state: QueryState<ListResponse<T>>) -> Vec<T> {
        self.take(state).map(|list| list.data).unwrap_or_default()
    }
}
