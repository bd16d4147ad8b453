use crate::app::checks::{CheckItem, CheckReport, CheckSection, RULE};
use crate::config::env_file::{FLASK_DEBUG, MODEL_API_URL, SECRET_KEY};
use crate::config::{EnvFile, ProjectPaths};
use crate::core::ModuleProbe;
use crate::utils::error::{LauncherError, Result};
use crate::utils::secret::generate_secret_key;

/// Keys must be longer than this to count as set.
pub const MIN_SECRET_KEY_LEN: usize = 20;

const PRODUCTION_TEMPLATE: &str = ".env.production";

const REQUIRED_MODULES: &[(&str, &str)] = &[
    ("flask", "Flask"),
    ("requests", "requests"),
    ("dotenv", "python-dotenv"),
    ("ebooklib", "ebooklib"),
    ("bs4", "beautifulsoup4"),
];

#[derive(Debug, Clone)]
pub struct ProductionAssessment {
    pub report: CheckReport,
    pub env_ok: bool,
    pub deps_ok: bool,
    pub dirs_ok: bool,
    pub gunicorn_installed: bool,
}

impl ProductionAssessment {
    /// Gunicorn is recommended, not required.
    pub fn ready(&self) -> bool {
        self.env_ok && self.deps_ok && self.dirs_ok
    }
}

pub async fn assess<M: ModuleProbe>(paths: &ProjectPaths, probe: &M) -> Result<ProductionAssessment> {
    let mut report = CheckReport::new("PRODUCTION READINESS CHECK");

    let env = EnvFile::load(&paths.env_file)?;
    let env_section = check_env(env.as_ref());
    let env_ok = !env_section.has_failures();
    report.push(env_section);

    let mut deps = CheckSection::new("📦 Checking dependencies...");
    for (module, package) in REQUIRED_MODULES {
        if probe.module_available(module).await {
            deps.push(CheckItem::ok(*package));
        } else {
            deps.push(CheckItem::failed(format!("{} not installed", package)));
        }
    }
    let deps_ok = !deps.has_failures();
    if !deps_ok {
        deps.push(CheckItem::warning("Install missing dependencies").with_hint("pip install -r requirements.txt"));
    }
    report.push(deps);

    let mut dirs = CheckSection::new("📁 Checking directories...");
    if paths.uploads_dir.is_dir() {
        dirs.push(CheckItem::ok("uploads/ directory exists"));
    } else {
        dirs.push(CheckItem::warning("uploads/ directory will be created on first run"));
    }
    let dirs_ok = true;
    report.push(dirs);

    let mut server = CheckSection::new("🚀 Checking production server...");
    let gunicorn_installed = probe.module_available("gunicorn").await;
    if gunicorn_installed {
        server.push(CheckItem::ok("Gunicorn is installed"));
    } else {
        server.push(
            CheckItem::warning("Gunicorn not installed (recommended for production)")
                .with_hint("Install with: pip install gunicorn"),
        );
    }
    report.push(server);

    Ok(ProductionAssessment {
        report,
        env_ok,
        deps_ok,
        dirs_ok,
        gunicorn_installed,
    })
}

pub fn check_env(env: Option<&EnvFile>) -> CheckSection {
    let mut section = CheckSection::new("🔍 Checking .env configuration...");

    let Some(env) = env else {
        section.push(CheckItem::failed(".env file not found").with_hint("Create one from: cp .env.production .env"));
        return section;
    };

    match env.get(FLASK_DEBUG).map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("false") => {
            section.push(CheckItem::ok("FLASK_DEBUG=False (production mode)"))
        }
        _ => section.push(CheckItem::failed("FLASK_DEBUG must be False for production")),
    }

    match env.secret_key() {
        Some(key) if key.len() > MIN_SECRET_KEY_LEN => section.push(CheckItem::ok("SECRET_KEY is set")),
        _ => section.push(
            CheckItem::failed("SECRET_KEY not set or too short")
                .with_hint("Generate one with: context-launcher check-production --fix"),
        ),
    }

    match env.model_api_url() {
        Some(url) => section.push(CheckItem::ok("MODEL_API_URL").with_detail(url.to_string())),
        None => section.push(CheckItem::failed("MODEL_API_URL not set")),
    }

    section
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixSummary {
    pub created_env: bool,
    pub debug_disabled: bool,
    pub secret_generated: bool,
}

impl FixSummary {
    pub fn changed_anything(&self) -> bool {
        self.created_env || self.debug_disabled || self.secret_generated
    }
}

/// Apply the safe `.env` fixes: create it from `.env.production`, turn debug
/// off, and generate a secret key when none is set. Other lines are kept.
pub fn apply_fixes(paths: &ProjectPaths) -> Result<FixSummary> {
    let mut summary = FixSummary::default();

    if !paths.env_file.is_file() {
        let template = paths.root.join(PRODUCTION_TEMPLATE);
        if !template.is_file() {
            return Err(LauncherError::MissingConfigError {
                field: PRODUCTION_TEMPLATE.to_string(),
            });
        }
        std::fs::copy(&template, &paths.env_file)?;
        tracing::info!("Created .env from {}", PRODUCTION_TEMPLATE);
        summary.created_env = true;
    }

    let mut env = EnvFile::parse(&paths.env_file)?;

    if env.debug_enabled() {
        env.set(FLASK_DEBUG, "False");
        summary.debug_disabled = true;
    }

    if env.secret_key().is_none() {
        let key = generate_secret_key();
        tracing::info!("Generated SECRET_KEY {}...", &key[..MIN_SECRET_KEY_LEN]);
        env.set(SECRET_KEY, &key);
        summary.secret_generated = true;
    }

    if summary.debug_disabled || summary.secret_generated {
        env.save()?;
    }

    if env.model_api_url().is_none() {
        tracing::warn!("{} is still empty; set it by hand", MODEL_API_URL);
    }

    Ok(summary)
}

pub fn production_command(port: u16) -> Vec<String> {
    vec![
        RULE.to_string(),
        "PRODUCTION DEPLOYMENT COMMAND".to_string(),
        RULE.to_string(),
        String::new(),
        "Run with Gunicorn (recommended):".to_string(),
        format!("  gunicorn -w 4 -b 0.0.0.0:{} --timeout 3600 app:app", port),
        String::new(),
        "Or with the development server:".to_string(),
        "  context-launcher".to_string(),
        String::new(),
    ]
}
