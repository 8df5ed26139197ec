use axum::http::Method;

use crate::telemetry::SynthProfile;

/// Operations reachable under `/api/{operation}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Metrics,
    Status,
    Validators,
    Blocks,
    Health,
    Transactions,
}

impl Endpoint {
    pub const ALL: [Endpoint; 6] = [
        Endpoint::Metrics,
        Endpoint::Status,
        Endpoint::Validators,
        Endpoint::Blocks,
        Endpoint::Health,
        Endpoint::Transactions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Metrics => "metrics",
            Endpoint::Status => "status",
            Endpoint::Validators => "validators",
            Endpoint::Blocks => "blocks",
            Endpoint::Health => "health",
            Endpoint::Transactions => "transactions",
        }
    }

    /// Exact, case-sensitive match on the path segment.
    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == segment)
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Endpoint::as_str).collect()
    }

    pub fn allowed_methods(&self, profile: &SynthProfile) -> Vec<Method> {
        match self {
            Endpoint::Transactions if profile.accepts_submissions => vec![Method::GET, Method::POST],
            _ => vec![Method::GET],
        }
    }

    pub fn allows(&self, method: &Method, profile: &SynthProfile) -> bool {
        self.allowed_methods(profile).contains(method)
    }
}

/// Methods accepted anywhere under `/api` for `profile`, excluding OPTIONS.
pub fn profile_methods(profile: &SynthProfile) -> Vec<Method> {
    if profile.accepts_submissions {
        vec![Method::GET, Method::POST]
    } else {
        vec![Method::GET]
    }
}

/// `GET, POST, OPTIONS` style list for `Allow` and CORS headers.
pub fn method_list(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .chain(std::iter::once("OPTIONS"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::profile::{BASIC, EXTENDED};

    #[test]
    fn segments_resolve() {
        for e in Endpoint::ALL {
            assert_eq!(Endpoint::from_segment(e.as_str()), Some(e));
        }
        assert_eq!(Endpoint::from_segment("Metrics"), None);
        assert_eq!(Endpoint::from_segment("peers"), None);
        assert_eq!(Endpoint::names().len(), 6);
    }

    #[test]
    fn post_only_on_extended_transactions() {
        assert!(Endpoint::Transactions.allows(&Method::POST, &EXTENDED));
        assert!(!Endpoint::Transactions.allows(&Method::POST, &BASIC));
        assert!(!Endpoint::Metrics.allows(&Method::POST, &EXTENDED));
        assert!(Endpoint::Metrics.allows(&Method::GET, &BASIC));
    }

    #[test]
    fn method_list_appends_options() {
        assert_eq!(method_list(&profile_methods(&BASIC)), "GET, OPTIONS");
        assert_eq!(method_list(&profile_methods(&EXTENDED)), "GET, POST, OPTIONS");
    }
}
