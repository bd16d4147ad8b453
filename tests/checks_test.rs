use anyhow::Result;
use async_trait::async_trait;
use context_launcher::app::checks::production::{apply_fixes, assess, MIN_SECRET_KEY_LEN};
use context_launcher::app::checks::setup::verify_setup;
use context_launcher::app::checks::CheckStatus;
use context_launcher::core::ModuleProbe;
use context_launcher::{EnvFile, LauncherConfig, LauncherError, ProjectPaths};
use std::collections::HashSet;
use tempfile::TempDir;

/// Probe that answers from a fixed set of importable modules.
struct FakeProbe {
    available: HashSet<&'static str>,
}

impl FakeProbe {
    fn with(modules: &[&'static str]) -> Self {
        Self {
            available: modules.iter().copied().collect(),
        }
    }
}

#[async_trait]
impl ModuleProbe for FakeProbe {
    async fn module_available(&self, module: &str) -> bool {
        self.available.contains(module)
    }
}

const ALL_MODULES: &[&str] = &["flask", "requests", "dotenv", "ebooklib", "bs4", "gunicorn"];

fn paths_for(dir: &TempDir) -> ProjectPaths {
    ProjectPaths::new(dir.path(), &LauncherConfig::default())
}

fn complete_project() -> Result<TempDir> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("app.py"), "print('hi')\n")?;
    std::fs::create_dir(dir.path().join("templates"))?;
    std::fs::write(dir.path().join("templates/index.html"), "<html></html>\n")?;
    std::fs::write(dir.path().join("requirements.txt"), "Flask\nrequests\n")?;
    Ok(dir)
}

#[tokio::test]
async fn test_verify_complete_project_passes() -> Result<()> {
    let dir = complete_project()?;
    let report = verify_setup(&paths_for(&dir), &FakeProbe::with(ALL_MODULES)).await?;

    assert!(report.all_ok());

    let files = report.section("MAIN FILES").unwrap();
    let server = files.item("Flask server").unwrap();
    assert_eq!(server.status, CheckStatus::Ok);
    assert_eq!(server.detail.as_deref(), Some("(12 bytes)"));

    // uploads/ is missing: only a warning, the launcher creates it.
    let dirs = report.section("DIRECTORIES").unwrap();
    assert_eq!(dirs.item("Uploads directory").unwrap().status, CheckStatus::Warning);
    Ok(())
}

#[tokio::test]
async fn test_verify_flags_missing_required_pieces() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("requirements.txt"), "Flask\n")?;

    let report = verify_setup(&paths_for(&dir), &FakeProbe::with(&["requests"])).await?;

    assert!(!report.all_ok());
    let files = report.section("MAIN FILES").unwrap();
    assert_eq!(files.item("Flask server").unwrap().status, CheckStatus::Failed);
    assert_eq!(files.item("Dependencies").unwrap().status, CheckStatus::Ok);

    let deps = report.section("DEPENDENCIES").unwrap();
    assert_eq!(deps.item("Flask NOT installed").unwrap().status, CheckStatus::Failed);
    assert_eq!(
        deps.item("ebooklib NOT installed").unwrap().status,
        CheckStatus::Warning
    );
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_verify_warns_about_non_executable_scripts() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = complete_project()?;
    let script = dir.path().join("start.sh");
    std::fs::write(&script, "#!/bin/bash\n")?;
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o644))?;

    let report = verify_setup(&paths_for(&dir), &FakeProbe::with(ALL_MODULES)).await?;
    let permissions = report.section("PERMISSIONS").unwrap();
    let item = permissions.item("start.sh").unwrap();

    assert_eq!(item.status, CheckStatus::Warning);
    assert_eq!(item.hint.as_deref(), Some("Run: chmod +x start.sh"));
    Ok(())
}

#[tokio::test]
async fn test_production_ready_project() -> Result<()> {
    let dir = complete_project()?;
    std::fs::create_dir(dir.path().join("uploads"))?;
    std::fs::write(
        dir.path().join(".env"),
        "FLASK_DEBUG=False\nSECRET_KEY=9f2c4e1a7b3d5f6e8a0c2e4f6a8b0d2f\nMODEL_API_URL=http://model:8090/v1/chat/completions\n",
    )?;

    let assessment = assess(&paths_for(&dir), &FakeProbe::with(ALL_MODULES)).await?;

    assert!(assessment.ready());
    assert!(assessment.gunicorn_installed);
    Ok(())
}

#[tokio::test]
async fn test_missing_gunicorn_does_not_block_production() -> Result<()> {
    let dir = complete_project()?;
    std::fs::write(
        dir.path().join(".env"),
        "FLASK_DEBUG=false\nSECRET_KEY=9f2c4e1a7b3d5f6e8a0c2e4f6a8b0d2f\nMODEL_API_URL=http://model:8090\n",
    )?;

    let probe = FakeProbe::with(&["flask", "requests", "dotenv", "ebooklib", "bs4"]);
    let assessment = assess(&paths_for(&dir), &probe).await?;

    assert!(assessment.ready());
    assert!(!assessment.gunicorn_installed);
    Ok(())
}

#[tokio::test]
async fn test_missing_dependency_blocks_production() -> Result<()> {
    let dir = complete_project()?;
    std::fs::write(
        dir.path().join(".env"),
        "FLASK_DEBUG=False\nSECRET_KEY=9f2c4e1a7b3d5f6e8a0c2e4f6a8b0d2f\nMODEL_API_URL=http://model:8090\n",
    )?;

    let probe = FakeProbe::with(&["flask", "requests", "dotenv", "bs4"]);
    let assessment = assess(&paths_for(&dir), &probe).await?;

    assert!(assessment.env_ok);
    assert!(!assessment.deps_ok);
    assert!(!assessment.ready());
    Ok(())
}

#[test]
fn test_fixes_disable_debug_and_generate_secret() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(
        dir.path().join(".env"),
        "# Flask\nFLASK_DEBUG=True\nSECRET_KEY=\nMODEL_API_URL=http://model:8090\n",
    )?;
    let paths = paths_for(&dir);

    let summary = apply_fixes(&paths)?;
    assert!(!summary.created_env);
    assert!(summary.debug_disabled);
    assert!(summary.secret_generated);

    let env = EnvFile::parse(&paths.env_file)?;
    assert!(!env.debug_enabled());
    assert!(env.secret_key().unwrap().len() > MIN_SECRET_KEY_LEN);
    assert_eq!(env.model_api_url(), Some("http://model:8090"));

    let content = std::fs::read_to_string(&paths.env_file)?;
    assert!(content.starts_with("# Flask\nFLASK_DEBUG=False\nSECRET_KEY="));

    // A second pass has nothing left to do.
    let summary = apply_fixes(&paths)?;
    assert!(!summary.changed_anything());
    Ok(())
}

#[test]
fn test_fixes_create_env_from_production_template() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(
        dir.path().join(".env.production"),
        "FLASK_DEBUG=False\nSECRET_KEY=\nMODEL_API_URL=http://model:8090\n",
    )?;
    let paths = paths_for(&dir);

    let summary = apply_fixes(&paths)?;

    assert!(summary.created_env);
    assert!(!summary.debug_disabled);
    assert!(summary.secret_generated);
    assert!(paths.env_file.is_file());
    Ok(())
}

#[test]
fn test_fixes_without_env_or_template_fail() {
    let dir = TempDir::new().unwrap();
    let result = apply_fixes(&paths_for(&dir));

    assert!(matches!(result, Err(LauncherError::MissingConfigError { .. })));
}

#[tokio::test]
async fn test_verify_lists_files_overview_document() -> Result<()> {
    let dir = complete_project()?;
    let report = verify_setup(&paths_for(&dir), &FakeProbe::with(ALL_MODULES)).await?;
    let docs = report.section("DOCUMENTATION").unwrap();
    assert_eq!(docs.item("Files overview").unwrap().status, CheckStatus::Warning);

    std::fs::write(dir.path().join("FILES_OVERVIEW.md"), "# Files\n")?;
    let report = verify_setup(&paths_for(&dir), &FakeProbe::with(ALL_MODULES)).await?;
    let docs = report.section("DOCUMENTATION").unwrap();
    assert_eq!(docs.item("Files overview").unwrap().status, CheckStatus::Ok);
    Ok(())
}
