use clap::Parser;
use context_launcher::adapters::PythonVenv;
use context_launcher::app::checks::{connection, production, setup, RULE};
use context_launcher::app::start::{launch_port, project_bootstrapper};
use context_launcher::utils::{logger, validation::Validate};
use context_launcher::{Cli, Command, EnvFile, LauncherConfig, ProjectPaths, Result};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI arguments: {:?}", cli);

    let code = match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(
                "❌ Launcher failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            e.exit_code()
        }
    };

    std::process::exit(code);
}

async fn run(cli: &Cli) -> Result<i32> {
    let mut config = LauncherConfig::load(&cli.dir, cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    let paths = ProjectPaths::resolve(&cli.dir, &config)?;

    match cli.command() {
        Command::Start => start(&config, &paths).await,
        Command::Verify => verify(&config, &paths).await,
        Command::CheckProduction { fix } => check_production(&config, &paths, fix).await,
        Command::TestConnection => test_connection(&config, &paths).await,
    }
}

async fn start(config: &LauncherConfig, paths: &ProjectPaths) -> Result<i32> {
    println!("🚀 Starting Research Assistant - Context Chatbot...");

    let bootstrapper = project_bootstrapper(config, paths)?;
    let report = bootstrapper.run().await?;

    if report.exit.interrupted {
        println!("👋 Application stopped");
    }
    Ok(report.exit.exit_code())
}

async fn verify(config: &LauncherConfig, paths: &ProjectPaths) -> Result<i32> {
    let probe = PythonVenv::new(paths, &config.environment);
    let report = setup::verify_setup(paths, &probe).await?;
    print_lines(&report.render());

    println!("{}", RULE);
    if report.all_ok() {
        println!("✅ VERIFICATION COMPLETED - ALL OK");
        println!();
        print_lines(&setup::next_steps(launch_port(config, &paths.env_file)));
    } else {
        println!("⚠️  VERIFICATION FINISHED WITH PROBLEMS");
        println!();
        println!("Review the messages above and fix the items marked with ❌");
        println!();
        println!("To install dependencies:");
        println!("   pip install -r {}", config.environment.manifest);
    }
    println!("{}", RULE);

    Ok(if report.all_ok() { 0 } else { 1 })
}

async fn check_production(config: &LauncherConfig, paths: &ProjectPaths, fix: bool) -> Result<i32> {
    let probe = PythonVenv::new(paths, &config.environment);
    let assessment = production::assess(paths, &probe).await?;
    print_lines(&assessment.report.render());

    println!("{}", RULE);
    if assessment.ready() {
        println!("✅ APPLICATION IS READY FOR PRODUCTION");
        if !assessment.gunicorn_installed {
            println!("⚠️  Consider installing Gunicorn for production");
        }
        print_lines(&production::production_command(launch_port(config, &paths.env_file)));
        return Ok(0);
    }

    println!("❌ ISSUES FOUND - NOT READY FOR PRODUCTION");
    if !assessment.env_ok {
        if fix {
            let summary = production::apply_fixes(paths)?;
            if summary.created_env {
                println!("✅ Created .env from .env.production");
            }
            if summary.debug_disabled {
                println!("✅ Set FLASK_DEBUG=False");
            }
            if summary.secret_generated {
                println!("✅ Generated a new SECRET_KEY");
            }
            if summary.changed_anything() {
                println!("✅ .env updated, run the check again");
            } else {
                println!("⚠️  Nothing could be fixed automatically");
            }
        } else {
            println!("💡 Re-run with --fix to apply the safe .env fixes");
        }
    }
    if !assessment.deps_ok {
        println!();
        println!("Install dependencies:");
        println!("  pip install -r {}", config.environment.manifest);
    }

    Ok(1)
}

async fn test_connection(config: &LauncherConfig, paths: &ProjectPaths) -> Result<i32> {
    config.validate_model()?;
    let env = EnvFile::load(&paths.env_file)?;
    let endpoint = connection::ModelEndpoint::resolve(&config.model, env.as_ref());
    let tester = connection::ConnectionTester::new(endpoint)?;

    print_lines(&connection::render_header(tester.endpoint()));
    let outcome = tester.run().await;
    print_lines(&connection::render_outcome(&outcome, tester.endpoint()));
    println!();
    println!("{}", RULE);

    Ok(if outcome.is_success() { 0 } else { 1 })
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
