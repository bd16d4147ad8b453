use crate::app::checks::{format_thousands, CheckItem, CheckReport, CheckSection};
use crate::config::{EnvFile, ProjectPaths};
use crate::core::ModuleProbe;
use crate::utils::error::Result;
use std::path::Path;

const REQUIRED_FILES: &[(&str, &str)] = &[
    ("app.py", "Flask server"),
    ("templates/index.html", "Web interface"),
    ("requirements.txt", "Dependencies"),
];

const SCRIPTS: &[(&str, &str)] = &[
    ("start.sh", "Start script (macOS)"),
    ("start_ubuntu.sh", "Start script (Ubuntu)"),
    ("test_connection.py", "Connection test"),
];

const DOCUMENTS: &[(&str, &str)] = &[
    ("README.md", "General documentation"),
    ("QUICK_START.md", "Quick start guide"),
    ("DEPLOYMENT_UBUNTU.md", "Ubuntu deployment guide"),
    ("FILES_OVERVIEW.md", "Files overview"),
];

const DIRECTORIES: &[(&str, &str)] = &[("templates", "Templates directory"), ("uploads", "Uploads directory")];

/// (import name, package name, required)
const MODULES: &[(&str, &str, bool)] = &[
    ("flask", "Flask", true),
    ("requests", "requests", true),
    ("ebooklib", "ebooklib", false),
    ("bs4", "beautifulsoup4", false),
];

pub async fn verify_setup<M: ModuleProbe>(paths: &ProjectPaths, probe: &M) -> Result<CheckReport> {
    let root = paths.root.as_path();
    let mut report = CheckReport::new("PROJECT VERIFICATION - CONTEXT CHATBOT");

    let mut files = CheckSection::new("📁 MAIN FILES:");
    for (file, description) in REQUIRED_FILES {
        files.push(file_item(root, file, description, true)?);
    }
    report.push(files);

    let mut scripts = CheckSection::new("🔧 SCRIPTS:");
    for (file, description) in SCRIPTS {
        scripts.push(file_item(root, file, description, false)?);
    }
    report.push(scripts);

    let mut docs = CheckSection::new("📚 DOCUMENTATION:");
    for (file, description) in DOCUMENTS {
        docs.push(file_item(root, file, description, false)?);
    }
    report.push(docs);

    let mut dirs = CheckSection::new("📂 DIRECTORIES:");
    for (dir, description) in DIRECTORIES {
        dirs.push(directory_item(root, dir, description)?);
    }
    report.push(dirs);

    if cfg!(unix) {
        let mut permissions = CheckSection::new("🔐 SCRIPT PERMISSIONS:");
        for (file, _) in SCRIPTS {
            let path = root.join(file);
            if !path.is_file() {
                continue;
            }
            if is_executable(&path)? {
                permissions.push(CheckItem::ok(*file).with_detail("[EXECUTABLE]"));
            } else {
                permissions.push(
                    CheckItem::warning(*file)
                        .with_detail("[NOT EXECUTABLE]")
                        .with_hint(format!("Run: chmod +x {}", file)),
                );
            }
        }
        report.push(permissions);
    }

    report.push(env_section(paths)?);

    let mut deps = CheckSection::new("📦 DEPENDENCIES:");
    for (module, package, required) in MODULES {
        let item = if probe.module_available(module).await {
            CheckItem::ok(format!("{} installed", package))
        } else if *required {
            CheckItem::failed(format!("{} NOT installed", package))
                .with_hint(format!("pip install {}", package))
        } else {
            CheckItem::warning(format!("{} NOT installed", package))
                .with_hint(format!("pip install {} (optional, only for EPUB files)", package))
        };
        deps.push(item);
    }
    report.push(deps);

    Ok(report)
}

/// Printed after the report when verification passed.
pub fn next_steps(port: u16) -> Vec<String> {
    vec![
        "🚀 NEXT STEPS:".to_string(),
        "   1. Start locally:           context-launcher".to_string(),
        "   2. Check the model server:  context-launcher test-connection".to_string(),
        format!("   3. Open in a browser:       http://localhost:{}", port),
        "   4. Before deploying:        context-launcher check-production".to_string(),
    ]
}

fn file_item(root: &Path, file: &str, description: &str, required: bool) -> Result<CheckItem> {
    let path = root.join(file);
    if path.is_file() {
        let size = std::fs::metadata(&path)?.len();
        return Ok(CheckItem::ok(description).with_detail(format!("({} bytes)", format_thousands(size))));
    }

    let item = if required {
        CheckItem::failed(description)
    } else {
        CheckItem::warning(description)
    };
    Ok(item.with_detail(format!("[{} NOT FOUND]", file)))
}

fn directory_item(root: &Path, dir: &str, description: &str) -> Result<CheckItem> {
    let path = root.join(dir);
    if path.is_dir() {
        let count = std::fs::read_dir(&path)?.count();
        Ok(CheckItem::ok(description).with_detail(format!("({} entries)", count)))
    } else {
        Ok(CheckItem::warning(description).with_detail("[MISSING - will be created]"))
    }
}

fn env_section(paths: &ProjectPaths) -> Result<CheckSection> {
    let mut section = CheckSection::new("🔍 ENVIRONMENT VARIABLES:");

    match EnvFile::load(&paths.env_file)? {
        Some(env) => {
            section.push(CheckItem::ok(".env file found"));

            let port = env
                .get_non_empty(crate::config::env_file::FLASK_PORT)
                .unwrap_or("5000");
            let model: String = env
                .model_name()
                .unwrap_or("not configured")
                .chars()
                .take(50)
                .collect();
            section.push(
                CheckItem::ok("Model API URL")
                    .with_detail(env.model_api_url().unwrap_or("not configured").to_string()),
            );
            section.push(CheckItem::ok("Model").with_detail(model));
            section.push(CheckItem::ok("Port").with_detail(port.to_string()));

            if env.debug_enabled() {
                section.push(
                    CheckItem::warning("Debug mode is on")
                        .with_hint("For production set FLASK_DEBUG=False in .env"),
                );
            } else {
                section.push(CheckItem::ok("Debug mode is off"));
            }
        }
        None => section.push(
            CheckItem::warning(".env file not found").with_hint("Create one with: cp .env.example .env"),
        ),
    }

    if paths.root.join(".env.example").is_file() {
        section.push(CheckItem::ok(".env.example available as a template"));
    }

    Ok(section)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;
    Ok(std::fs::metadata(path)?.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> Result<bool> {
    Ok(true)
}
