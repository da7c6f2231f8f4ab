//! Assembly engine: request spec → one browser-ready script.
//!
//! One call owns one [`BuildSet`]. Tokens are processed in sorted order; for
//! each, the header and the definition fragment are both resolved before
//! either is committed, so a half-available service never leaves a header
//! without its definition in the output.
//!
//! # Failure policy
//!
//! | origin     | module missing                         |
//! |------------|----------------------------------------|
//! | explicit   | collected, one `MissingModules` at end |
//! | default    | dropped with a warning                 |
//! | mandatory  | follows the origin of the request      |
//!
//! Cache and source failures of a single fragment count as "missing".
//! Everything else aborts the build.

use sdkpack_config::BuildConfig;
use sdkpack_core::error::{Error, Result};
use sdkpack_core::fragment::{BuildSet, FragmentId};
use sdkpack_core::request::{ALL_SERVICES, BuildRequest, LATEST, RequestOrigin, RequestSpec};
use sdkpack_core::strategy::BuildStrategy;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The result of one assembly.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub code: String,
    /// Fragments in output order (the core is implicit).
    pub fragments: Vec<FragmentId>,
    /// Default-list tokens that could not be satisfied.
    pub dropped: Vec<String>,
}

pub struct AssemblyEngine {
    strategy: Arc<dyn BuildStrategy>,
    default_services: Vec<String>,
    mandatory_service: String,
}

impl AssemblyEngine {
    /// Engine with the stock default list and `sts` as mandatory service.
    pub fn new(strategy: Arc<dyn BuildStrategy>) -> Self {
        let defaults = BuildConfig::default();
        Self {
            strategy,
            default_services: defaults.default_services,
            mandatory_service: defaults.mandatory_service,
        }
    }

    pub fn from_config(strategy: Arc<dyn BuildStrategy>, config: &BuildConfig) -> Self {
        Self {
            strategy,
            default_services: config.default_services.clone(),
            mandatory_service: config.mandatory_service.clone(),
        }
    }

    pub fn with_default_services(mut self, services: Vec<String>) -> Self {
        self.default_services = services;
        self
    }

    pub fn with_mandatory_service(mut self, service: impl Into<String>) -> Self {
        self.mandatory_service = service.into();
        self
    }

    pub fn strategy(&self) -> &Arc<dyn BuildStrategy> {
        &self.strategy
    }

    /// Build the script for `spec` (`None` or blank = default services).
    pub async fn build(&self, spec: Option<&str>) -> Result<String> {
        Ok(self.assemble(spec).await?.code)
    }

    /// Like [`build`](Self::build), also reporting what went in.
    pub async fn assemble(&self, spec: Option<&str>) -> Result<Assembly> {
        let spec = RequestSpec::parse(spec, &self.default_services)?;
        let origin = spec.origin();
        let mut run = Run::new(self.strategy.as_ref(), origin);

        for token in spec.tokens() {
            if token == ALL_SERVICES {
                run.add_all().await?;
            } else {
                run.add(&BuildRequest::parse(token, origin)).await?;
            }
        }

        if !run.set.has_service(&self.mandatory_service) {
            let mandatory = BuildRequest::new(&self.mandatory_service, LATEST, RequestOrigin::Mandatory);
            run.add(&mandatory).await?;
        }

        if !run.missing.is_empty() {
            return Err(Error::MissingModules(run.missing));
        }

        let core = self.strategy.core().await?;
        let code = compose(&core, &run.texts);

        info!(
            strategy = self.strategy.name(),
            minified = self.strategy.minified(),
            fragments = run.texts.len(),
            dropped = run.dropped.len(),
            bytes = code.len(),
            "Bundle assembled"
        );

        Ok(Assembly {
            code,
            fragments: run.set.emitted().to_vec(),
            dropped: run.dropped,
        })
    }
}

/// `core;f1\nf2\n...` with no trailing separator.
pub fn compose(core: &str, fragments: &[String]) -> String {
    let mut out = String::with_capacity(
        core.len() + 1 + fragments.iter().map(|f| f.len() + 1).sum::<usize>(),
    );
    out.push_str(core);
    out.push(';');
    out.push_str(&fragments.join("\n"));
    out
}

/// State of one assembly.
struct Run<'a> {
    strategy: &'a dyn BuildStrategy,
    origin: RequestOrigin,
    set: BuildSet,
    texts: Vec<String>,
    missing: Vec<String>,
    dropped: Vec<String>,
}

impl<'a> Run<'a> {
    fn new(strategy: &'a dyn BuildStrategy, origin: RequestOrigin) -> Self {
        Self {
            strategy,
            origin,
            set: BuildSet::new(),
            texts: Vec::new(),
            missing: Vec::new(),
            dropped: Vec::new(),
        }
    }

    /// Add one request, recording it as missing or dropped on a miss.
    async fn add(&mut self, request: &BuildRequest) -> Result<()> {
        if self.resolve(request).await? {
            return Ok(());
        }

        let token = request.token().to_string();
        match self.origin {
            RequestOrigin::Default => {
                warn!(service = %token, "Default service unavailable, dropping");
                if !self.dropped.contains(&token) {
                    self.dropped.push(token);
                }
            }
            RequestOrigin::Explicit | RequestOrigin::Mandatory => {
                if !self.missing.contains(&token) {
                    self.missing.push(token);
                }
            }
        }
        Ok(())
    }

    /// Every stable `(service, version)` of the catalog. Prerelease versions
    /// are only built, never emitted, and only when that warms a cache.
    async fn add_all(&mut self) -> Result<()> {
        let pairs: Vec<(String, String, bool)> = self
            .strategy
            .catalog()
            .pairs()
            .into_iter()
            .map(|(s, v, pre)| (s.to_string(), v.to_string(), pre))
            .collect();

        for (service, version, prerelease) in pairs {
            if prerelease {
                if self.strategy.writes_cache() {
                    debug!(service = %service, version = %version, "Warming prerelease fragments");
                    self.fetch(&FragmentId::header(&service), self.strategy.service_header(&service).await)?;
                    self.fetch(
                        &FragmentId::definition(&service, &version),
                        self.strategy.service(&service, &version).await,
                    )?;
                }
                continue;
            }
            self.add(&BuildRequest::new(service, version, self.origin)).await?;
        }
        Ok(())
    }

    /// Resolve both fragments of a request, committing them only if both
    /// exist. `Ok(false)` = module missing.
    async fn resolve(&mut self, request: &BuildRequest) -> Result<bool> {
        let service = request.service.as_str();
        let Some(version) = self
            .strategy
            .catalog()
            .resolve_version(service, &request.version)
            .map(str::to_string)
        else {
            debug!(token = request.token(), "Version not in catalog");
            return Ok(false);
        };

        let header_id = FragmentId::header(service);
        let definition_id = FragmentId::definition(service, &version);

        let header = if self.set.contains(&header_id) {
            None
        } else {
            match self.fetch(&header_id, self.strategy.service_header(service).await)? {
                Some(text) => Some(text),
                None => return Ok(false),
            }
        };

        let definition = if self.set.contains(&definition_id) {
            None
        } else {
            match self.fetch(&definition_id, self.strategy.service(service, &version).await)? {
                Some(text) => Some(text),
                None => return Ok(false),
            }
        };

        if let Some(text) = header {
            self.set.insert(header_id);
            self.texts.push(text);
        }
        if let Some(text) = definition {
            self.set.insert(definition_id);
            self.texts.push(text);
        }
        Ok(true)
    }

    /// Map a strategy result onto the failure policy.
    fn fetch(&self, id: &FragmentId, result: Result<Option<String>>) -> Result<Option<String>> {
        match result {
            Ok(text) => Ok(text),
            Err(e) if !e.is_fatal() => {
                warn!(fragment = %id, error = %e, "Fragment unavailable");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
