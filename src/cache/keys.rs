use std::fmt;

use crate::query::{Endpoint, ToQuery};

/// Identity of one logical query: the endpoint plus its canonical
/// parameters.
///
/// Pairs are sorted by name so that the key does not depend on the order a
/// parameter type happens to emit them in. The same pairs are sent on the
/// wire, which lets a background refresh re-issue a request from the key
/// alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    endpoint: Endpoint,
    params: Vec<(String, String)>,
}

impl QueryKey {
    pub fn new(endpoint: Endpoint, params: &impl ToQuery) -> Self {
        let mut params: Vec<(String, String)> = params
            .query_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        params.sort();
        Self { endpoint, params }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Renders like a relative URL, for logs: `/events?endDate=...&page=1`.
impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint.path())?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{name}={value}")?;
        }
        Ok(())
    }
}
