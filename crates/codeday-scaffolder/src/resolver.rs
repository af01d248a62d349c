//! Latest-version lookups against an npm-compatible registry

use crate::error::{Result, ScaffoldError};
use crate::product::ProductConfig;
use crate::report::Reporter;
use indexmap::IndexMap;
use semver::Version;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tokio::task::JoinSet;
use url::Url;

/// Abbreviated packument format; only carries what installs need
const ABBREVIATED_ACCEPT: &str = "application/vnd.npm.install-v1+json";

/// The slice of a registry packument we read
#[derive(Debug, Deserialize)]
struct Packument {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
}

/// Maps package names to caret ranges of their latest published versions
#[derive(Debug, Clone)]
pub struct DependencyResolver {
    registry: Url,
    client: reqwest::Client,
}

impl DependencyResolver {
    /// Create a resolver for the given registry base URL
    pub fn new(registry: Url, user_agent: &str) -> Self {
        Self {
            registry,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Create a resolver from a product config, honoring the registry env override
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let url_str = std::env::var(config.registry_env())
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| config.default_registry_url().to_string());
        let registry = Url::parse(&url_str)
            .map_err(|e| ScaffoldError::resolution("<registry>", format!("{url_str}: {e}")))?;
        Ok(Self::new(registry, config.user_agent()))
    }

    pub fn registry(&self) -> &Url {
        &self.registry
    }

    /// Registry URL of a package document; scoped names keep `@` and encode `/`
    pub fn package_url(&self, name: &str) -> Result<Url> {
        let mut url = self.registry.clone();
        url.path_segments_mut()
            .map_err(|_| ScaffoldError::resolution(name, "registry URL cannot have a path"))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    /// Latest published version of a single package
    pub async fn latest_version(&self, name: &str) -> Result<Version> {
        let url = self.package_url(name)?;
        fetch_latest(self.client.clone(), url, name.to_string()).await
    }

    /// Resolve every name to `^<latest>`.
    ///
    /// Lookups run concurrently; the first failure cancels the rest and fails
    /// the whole call. The returned map follows the order of `names`.
    pub async fn resolve(
        &self,
        names: &[&str],
        reporter: &dyn Reporter,
    ) -> Result<IndexMap<String, String>> {
        let mut lookups = JoinSet::new();
        let mut seen = HashSet::with_capacity(names.len());
        for name in names {
            if !seen.insert(*name) {
                continue;
            }
            let url = self.package_url(name)?;
            let client = self.client.clone();
            let name = name.to_string();
            reporter.debug("lookup", &url.to_string());
            lookups.spawn(async move {
                let version = fetch_latest(client, url, name.clone()).await;
                (name, version)
            });
        }

        let mut resolved: HashMap<String, Version> = HashMap::with_capacity(names.len());
        while let Some(joined) = lookups.join_next().await {
            let (name, version) =
                joined.map_err(|e| ScaffoldError::resolution("<lookup task>", e))?;
            // Returning here drops the JoinSet, aborting lookups still in flight
            let version = version?;
            reporter.debug("resolved", &format!("{name}@{version}"));
            resolved.insert(name, version);
        }

        names
            .iter()
            .map(|name| {
                resolved
                    .get(*name)
                    .map(|v| (name.to_string(), caret(v)))
                    .ok_or_else(|| ScaffoldError::resolution(name, "lookup produced no result"))
            })
            .collect()
    }
}

/// `^x.y.z` range for a resolved version
pub fn caret(version: &Version) -> String {
    format!("^{version}")
}

async fn fetch_latest(client: reqwest::Client, url: Url, name: String) -> Result<Version> {
    let response = client
        .get(url.clone())
        .header(reqwest::header::ACCEPT, ABBREVIATED_ACCEPT)
        .send()
        .await
        .map_err(|e| ScaffoldError::resolution(&name, format!("request to {url} failed: {e}")))?;

    if !response.status().is_success() {
        return Err(ScaffoldError::resolution(
            &name,
            format!("HTTP {} from {}", response.status(), url),
        ));
    }

    let packument: Packument = response
        .json()
        .await
        .map_err(|e| ScaffoldError::resolution(&name, format!("invalid registry response: {e}")))?;

    let latest = packument
        .dist_tags
        .get("latest")
        .ok_or_else(|| ScaffoldError::resolution(&name, "no 'latest' dist-tag published"))?;

    Version::parse(latest)
        .map_err(|e| ScaffoldError::resolution(&name, format!("invalid version '{latest}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Level, Recorder, Silent};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn latest(version: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "ignored",
            "dist-tags": { "latest": version, "next": "99.0.0-rc.1" }
        }))
    }

    fn resolver_for(server: &MockServer) -> DependencyResolver {
        let registry = Url::parse(&server.uri()).unwrap();
        DependencyResolver::new(registry, "codeday-scaffolder-tests")
    }

    #[test]
    fn test_package_url_encodes_scoped_names() {
        let resolver = DependencyResolver::new(
            Url::parse("https://registry.npmjs.org/").unwrap(),
            "test",
        );

        let url = resolver.package_url("@codeday/topo").unwrap();
        assert_eq!(url.as_str(), "https://registry.npmjs.org/@codeday%2Ftopo");

        let url = resolver.package_url("react").unwrap();
        assert_eq!(url.as_str(), "https://registry.npmjs.org/react");
    }

    #[test]
    fn test_package_url_keeps_registry_path_prefix() {
        let resolver = DependencyResolver::new(
            Url::parse("https://npm.example.com/mirror/").unwrap(),
            "test",
        );

        let url = resolver.package_url("next").unwrap();
        assert_eq!(url.as_str(), "https://npm.example.com/mirror/next");
    }

    #[test]
    fn test_caret_prefix() {
        assert_eq!(caret(&Version::parse("18.2.0").unwrap()), "^18.2.0");
        assert_eq!(
            caret(&Version::parse("1.0.0-beta.3").unwrap()),
            "^1.0.0-beta.3"
        );
    }

    #[tokio::test]
    async fn test_resolve_returns_caret_ranges_in_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pkg-b"))
            .and(header("accept", ABBREVIATED_ACCEPT))
            .respond_with(latest("2.5.1"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pkg-a"))
            .respond_with(latest("1.0.0"))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server);
        let recorder = Recorder::new();
        let deps = resolver
            .resolve(&["pkg-b", "pkg-a"], &recorder)
            .await
            .unwrap();

        assert_eq!(deps.len(), 2);
        let keys: Vec<_> = deps.keys().map(String::as_str).collect();
        assert_eq!(keys, ["pkg-b", "pkg-a"]);
        assert_eq!(deps["pkg-a"], "^1.0.0");
        assert_eq!(deps["pkg-b"], "^2.5.1");
        assert_eq!(recorder.at(Level::Debug).len(), 4);
    }

    #[tokio::test]
    async fn test_duplicate_names_are_looked_up_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pkg-a"))
            .respond_with(latest("1.0.0"))
            .expect(1)
            .mount(&server)
            .await;

        let deps = resolver_for(&server)
            .resolve(&["pkg-a", "pkg-a"], &Recorder::new())
            .await
            .unwrap();

        assert_eq!(deps.len(), 1);
        assert_eq!(deps["pkg-a"], "^1.0.0");
    }

    #[tokio::test]
    async fn test_single_failure_fails_whole_resolution() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pkg-a"))
            .respond_with(latest("1.0.0"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pkg-b"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server);
        let err = resolver
            .resolve(&["pkg-a", "pkg-b"], &Silent)
            .await
            .unwrap_err();

        match err {
            ScaffoldError::Resolution { package, reason } => {
                assert_eq!(package, "pkg-b");
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_latest_version_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weird"))
            .respond_with(latest("not-a-version"))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server);
        let err = resolver.latest_version("weird").await.unwrap_err();
        assert!(matches!(err, ScaffoldError::Resolution { .. }));
    }

    #[tokio::test]
    async fn test_missing_latest_tag_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/untagged"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "dist-tags": {}
            })))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server);
        let err = resolver.latest_version("untagged").await.unwrap_err();
        assert!(err.to_string().contains("latest"));
    }

    #[tokio::test]
    async fn test_empty_name_list_resolves_to_empty_map() {
        let server = MockServer::start().await;
        let resolver = resolver_for(&server);
        let deps = resolver.resolve(&[], &Silent).await.unwrap();
        assert!(deps.is_empty());
    }
}
