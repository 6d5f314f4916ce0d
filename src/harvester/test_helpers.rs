//! Shared test doubles: a scripted render backend plus fixture builders.
//!
//! `SiteFixture` scripts navigation outcomes and page contents per URL;
//! `StubProvider`/`StubSession` implement the render capability traits over
//! it deterministically, recording everything the orchestrator does to them.

use crate::config::{Config, DelayRange, OutputConfig, RetryConfig};
use crate::error::{NavigationError, RenderError, SessionError};
use crate::harvester::Harvester;
use crate::identity::{SessionIdentity, StorageScope};
use crate::render::{ElementHandle, RenderSession, SessionProvider};
use crate::types::WorkItem;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted DOM element
#[derive(Clone, Debug, Default)]
pub(crate) struct StubElement {
    pub text: String,
    pub attrs: HashMap<String, String>,
}

impl StubElement {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            attrs: HashMap::new(),
        }
    }

    pub fn attr(name: &str, value: &str) -> Self {
        let mut attrs = HashMap::new();
        attrs.insert(name.to_string(), value.to_string());
        Self {
            text: String::new(),
            attrs,
        }
    }
}

/// Scripted contents of one rendered page: (selector, element) pairs in
/// document order
#[derive(Clone, Debug, Default)]
pub(crate) struct PageSpec {
    elements: Vec<(String, StubElement)>,
}

impl PageSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: &str, element: StubElement) -> Self {
        self.elements.push((selector.to_string(), element));
        self
    }

    /// A healthy product page: metadata title, body text with prices, and an
    /// add-to-cart control
    pub fn product(name: &str, body: &str) -> Self {
        Self::new()
            .with(
                r#"meta[property="og:title"]"#,
                StubElement::attr("content", &format!("{name} | Toko Example")),
            )
            .with("body", StubElement::text(body))
            .with(r#"[data-testid="btn-buy"]"#, StubElement::text("+ Keranjang"))
    }

    /// A page with nothing extractable on it
    pub fn empty() -> Self {
        Self::new()
    }

    fn matching(&self, selector: &str) -> Vec<StubElement> {
        self.elements
            .iter()
            .filter(|(sel, _)| sel == selector)
            .map(|(_, el)| el.clone())
            .collect()
    }
}

/// Scripted navigation outcome for one URL
#[derive(Clone, Copy, Debug)]
pub(crate) enum NavPlan {
    Ok,
    /// Fail the first `n` navigation attempts, then succeed
    FailFirst(u32),
    AlwaysFail,
}

/// Scripted site shared by every session a provider opens.
///
/// Navigation attempt counters live here so per-URL failure plans span
/// session boundaries.
#[derive(Default)]
pub(crate) struct SiteFixture {
    pages: HashMap<String, PageSpec>,
    plans: HashMap<String, NavPlan>,
    nav_attempts: Mutex<HashMap<String, u32>>,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: PageSpec) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn plan(mut self, url: &str, plan: NavPlan) -> Self {
        self.plans.insert(url.to_string(), plan);
        self
    }

    pub fn nav_attempts_for(&self, url: &str) -> u32 {
        self.nav_attempts
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(0)
    }
}

/// Deterministic [`SessionProvider`] recording opens and storage discards
pub(crate) struct StubProvider {
    site: Arc<SiteFixture>,
    opened: Mutex<Vec<Option<String>>>,
    discarded: Mutex<Vec<String>>,
    fail_open: Mutex<u32>,
}

impl StubProvider {
    pub fn new(site: SiteFixture) -> Self {
        Self {
            site: Arc::new(site),
            opened: Mutex::new(Vec::new()),
            discarded: Mutex::new(Vec::new()),
            fail_open: Mutex::new(0),
        }
    }

    /// Make the next `n` `open` calls fail with an acquisition error
    pub fn fail_next_opens(&self, n: u32) {
        *self.fail_open.lock().unwrap() = n;
    }

    /// Proxy endpoint of every session opened so far, in order
    pub fn opened(&self) -> Vec<Option<String>> {
        self.opened.lock().unwrap().clone()
    }

    /// Storage scopes discarded so far, in order
    pub fn discarded(&self) -> Vec<String> {
        self.discarded.lock().unwrap().clone()
    }

    pub fn nav_attempts_for(&self, url: &str) -> u32 {
        self.site.nav_attempts_for(url)
    }
}

#[async_trait]
impl SessionProvider for StubProvider {
    async fn open(
        &self,
        identity: &SessionIdentity,
    ) -> Result<Box<dyn RenderSession>, SessionError> {
        self.opened
            .lock()
            .unwrap()
            .push(identity.proxy.as_ref().map(|u| u.to_string()));

        let mut fail = self.fail_open.lock().unwrap();
        if *fail > 0 {
            *fail -= 1;
            return Err(SessionError::Acquisition {
                message: "scripted launch failure".to_string(),
            });
        }

        Ok(Box::new(StubSession::new(self.site.clone())))
    }

    async fn discard_storage(&self, scope: &StorageScope) -> Result<(), SessionError> {
        self.discarded.lock().unwrap().push(scope.to_string());
        Ok(())
    }
}

/// One scripted render session over a [`SiteFixture`]
pub(crate) struct StubSession {
    site: Arc<SiteFixture>,
    current: Mutex<Option<String>>,
    registry: Mutex<Vec<StubElement>>,
}

impl StubSession {
    pub fn new(site: Arc<SiteFixture>) -> Self {
        Self {
            site,
            current: Mutex::new(None),
            registry: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RenderSession for StubSession {
    async fn navigate(&self, url: &WorkItem, _timeout: Duration) -> Result<(), NavigationError> {
        let attempt = {
            let mut attempts = self.site.nav_attempts.lock().unwrap();
            let count = attempts.entry(url.as_str().to_string()).or_insert(0);
            *count += 1;
            *count
        };

        let plan = self
            .site
            .plans
            .get(url.as_str())
            .copied()
            .unwrap_or(NavPlan::Ok);
        let fail = match plan {
            NavPlan::Ok => false,
            NavPlan::AlwaysFail => true,
            NavPlan::FailFirst(n) => attempt <= n,
        };
        if fail {
            return Err(NavigationError::Network {
                url: url.to_string(),
                message: "scripted connection reset".to_string(),
            });
        }

        *self.current.lock().unwrap() = Some(url.as_str().to_string());
        self.registry.lock().unwrap().clear();
        Ok(())
    }

    async fn query_first(&self, selector: &str) -> Result<Option<ElementHandle>, RenderError> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>, RenderError> {
        let current = self.current.lock().unwrap().clone();
        let Some(current) = current else {
            return Ok(Vec::new());
        };
        let Some(page) = self.site.pages.get(&current) else {
            return Ok(Vec::new());
        };

        let mut registry = self.registry.lock().unwrap();
        let mut handles = Vec::new();
        for element in page.matching(selector) {
            registry.push(element);
            handles.push(ElementHandle((registry.len() - 1) as u64));
        }
        Ok(handles)
    }

    async fn attribute(
        &self,
        handle: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, RenderError> {
        let registry = self.registry.lock().unwrap();
        let element = registry
            .get(handle.0 as usize)
            .ok_or(RenderError::StaleHandle { handle: handle.0 })?;
        Ok(element.attrs.get(name).cloned())
    }

    async fn text(&self, handle: ElementHandle) -> Result<String, RenderError> {
        let registry = self.registry.lock().unwrap();
        let element = registry
            .get(handle.0 as usize)
            .ok_or(RenderError::StaleHandle { handle: handle.0 })?;
        Ok(element.text.clone())
    }
}

/// A session with `page` already rendered, for extraction tests
pub(crate) async fn loaded_page(page: PageSpec) -> StubSession {
    let site = Arc::new(SiteFixture::new().page("https://stub.example", page));
    let session = StubSession::new(site);
    session
        .navigate(&WorkItem::new("https://stub.example"), Duration::from_secs(1))
        .await
        .unwrap();
    session
}

/// Millisecond-scale configuration rooted in a temp directory
pub(crate) fn test_config(dir: &Path) -> Config {
    Config {
        input_list: dir.join("urls.txt"),
        proxy_list: dir.join("proxies.txt"),
        storage_root: dir.join("profiles"),
        output: OutputConfig {
            jsonl_path: dir.join("records.jsonl"),
            table_path: dir.join("records.csv"),
            snapshot_path: dir.join("records.json"),
        },
        navigation_timeout: Duration::from_millis(50),
        navigation_retry: RetryConfig {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        page_settle_delay: DelayRange::from_millis(0, 1),
        item_delay: DelayRange::from_millis(0, 1),
        batch_size: 0,
        batch_pause: DelayRange::from_millis(1, 2),
        session_rotate_every: 0,
        pool_cycle_cooldown: DelayRange::from_millis(0, 1),
        block_threshold: 3,
        max_global_retries: 5,
    }
}

pub(crate) fn write_lines(path: &Path, lines: &[&str]) {
    std::fs::write(path, lines.join("\n") + "\n").unwrap();
}

/// Build a harvester over a scripted site with the fast test configuration
pub(crate) fn harvester_with(
    dir: &Path,
    urls: &[&str],
    site: SiteFixture,
) -> (Harvester, Arc<StubProvider>) {
    write_lines(&dir.join("urls.txt"), urls);
    let provider = Arc::new(StubProvider::new(site));
    let harvester = Harvester::new(test_config(dir), provider.clone()).unwrap();
    (harvester, provider)
}
