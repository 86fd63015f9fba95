use super::{QueryClient, QueryState};
use crate::{
    models::{
        Company, CompanyActivity, CompanyAnalytics, EndpointActivity, EventDistribution,
        EventMetrics, EventTypeCount, ListResponse, MetricsResponse, MultiCompanyTrendsResponse,
        RetentionResponse, SearchResponse, TimeSeriesResponse, UserActivity,
    },
    query::{
        Endpoint, FilterParams, LeaderboardParams, QueryBuilder, QueryParams, RetentionParams,
        TrendsParams,
    },
    reshape::CompanyChart,
};

/// Typed access to every backend endpoint through a shared [`QueryClient`].
#[derive(Clone)]
pub struct AnalyticsService {
    client: QueryClient,
    builder: QueryBuilder,
}

impl AnalyticsService {
    pub fn new(client: QueryClient, builder: QueryBuilder) -> Self {
        Self { client, builder }
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    pub async fn search_events(&self, params: &QueryParams) -> QueryState<SearchResponse> {
        self.client.fetch(Endpoint::Events, params).await
    }

    pub async fn event_metrics(&self, params: &FilterParams) -> QueryState<EventMetrics> {
        self.client.fetch(Endpoint::EventMetrics, params).await
    }

    pub async fn metrics(&self, params: &FilterParams) -> QueryState<MetricsResponse> {
        self.client.fetch(Endpoint::Metrics, params).await
    }

    pub async fn trends(&self, params: &TrendsParams) -> QueryState<TimeSeriesResponse> {
        self.client.fetch(Endpoint::Trends, params).await
    }

    pub async fn multi_company_trends(
        &self,
        params: &TrendsParams,
    ) -> QueryState<MultiCompanyTrendsResponse> {
        self.client.fetch(Endpoint::MultiCompanyTrends, params).await
    }

    /// Multi-company trends reshaped for charting, with the pie totals
    /// restricted to the companies in `params`.
    pub async fn company_chart(&self, params: &TrendsParams) -> QueryState<CompanyChart> {
        self.multi_company_trends(params)
            .await
            .map(|response| CompanyChart::build(&response.data, &params.companies))
    }

    pub async fn companies(&self) -> QueryState<ListResponse<Company>> {
        self.client.fetch(Endpoint::Companies, &()).await
    }

    pub async fn event_types(&self) -> QueryState<ListResponse<EventDistribution>> {
        self.client.fetch(Endpoint::EventTypes, &()).await
    }

    pub async fn company_analytics(&self) -> QueryState<ListResponse<CompanyAnalytics>> {
        self.client.fetch(Endpoint::CompanyAnalytics, &()).await
    }

    pub async fn event_distribution(&self) -> QueryState<ListResponse<EventDistribution>> {
        self.client.fetch(Endpoint::EventDistribution, &()).await
    }

    pub async fn top_events(
        &self,
        params: &LeaderboardParams,
    ) -> QueryState<ListResponse<EventTypeCount>> {
        self.client.fetch(Endpoint::TopEvents, params).await
    }

    pub async fn active_users(
        &self,
        params: &LeaderboardParams,
    ) -> QueryState<ListResponse<UserActivity>> {
        self.client.fetch(Endpoint::ActiveUsers, params).await
    }

    pub async fn top_endpoints(
        &self,
        params: &LeaderboardParams,
    ) -> QueryState<ListResponse<EndpointActivity>> {
        self.client.fetch(Endpoint::TopEndpoints, params).await
    }

    pub async fn top_companies(
        &self,
        params: &LeaderboardParams,
    ) -> QueryState<ListResponse<CompanyActivity>> {
        self.client.fetch(Endpoint::TopCompanies, params).await
    }

    pub async fn retention(&self, params: &RetentionParams) -> QueryState<RetentionResponse> {
        self.client.fetch(Endpoint::Retention, params).await
    }
}
