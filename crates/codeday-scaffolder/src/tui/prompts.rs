//! Charm-style CLI prompts using cliclack

use crate::error::ScaffoldError;
use crate::guard::{AssumeYes, OverwritePrompt};
use crate::pipeline::{CreateRequest, Outcome, ProjectBuilder, ProjectSummary};
use crate::product::ProductConfig;
use crate::report::{Level, Reporter};
use crate::runtime::InstallResult;
use crate::templates::{PlaceholderMap, TemplateSource};
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project directory to create (relative paths resolve against the cwd)
    pub directory: PathBuf,

    /// Project name (defaults to the directory name)
    pub name: Option<String>,

    /// Local directory to use for templates instead of the configured source
    pub template_dir: Option<PathBuf>,

    /// Placeholders contributed by feature flags
    pub placeholders: PlaceholderMap,

    /// Show lookup and substitution tracing
    pub verbose: bool,

    /// Overwrite a non-empty directory without asking
    pub yes: bool,

    /// Do not run the package manager after generation
    pub skip_install: bool,
}

/// Status events rendered through `cliclack::log`
#[derive(Debug, Clone, Copy, Default)]
pub struct CliclackReporter {
    verbose: bool,
}

impl CliclackReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for CliclackReporter {
    fn notify(&self, level: Level, action: &str, detail: &str) {
        let line = format!("{action}: {detail}");
        // Display failures must not abort generation
        let _ = match level {
            Level::Create => cliclack::log::success(line),
            Level::Info => cliclack::log::info(line),
            Level::Warn => cliclack::log::warning(line),
            Level::Error => cliclack::log::error(line),
            Level::Debug if self.verbose => cliclack::log::remark(line),
            Level::Debug => Ok(()),
        };
    }
}

/// Asks before a non-empty destination is cleared (defaults to "no")
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmPrompt;

impl OverwritePrompt for ConfirmPrompt {
    fn confirm_overwrite(&self, _dir: &Path) -> Result<bool, ScaffoldError> {
        match cliclack::confirm("Destination is not empty. Overwrite?")
            .initial_value(false)
            .interact()
        {
            Ok(answer) => Ok(answer),
            // Ctrl+C / Esc on the prompt counts as declining
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(false),
            Err(e) => Err(ScaffoldError::Prompt(e)),
        }
    }
}

/// Run the CLI with interactive prompts
pub async fn run<C: ProductConfig>(config: &C, args: CreateArgs, cli_version: &str) -> Result<()> {
    cliclack::intro(config.display_name())?;

    let reporter = CliclackReporter::new(args.verbose);

    // Step 1: Resolve the destination
    let project_dir = resolve_directory(&args.directory)?;
    cliclack::log::info(format!("Using directory: {}", project_dir.display()))?;

    // Step 2: Load the template
    let source = setup_source(config, &args.template_dir)?;
    let tree = source
        .load(config.template_name(), config.user_agent())
        .await
        .with_context(|| format!("Failed to load template '{}'", config.template_name()))?;

    if let Some(warning) = tree.manifest().compatibility_warning(cli_version) {
        cliclack::log::warning(format!("Version warning: {warning}"))?;
    }

    // Step 3: Generate and install
    let builder = ProjectBuilder::from_config(config)?;
    let request = CreateRequest {
        target_dir: project_dir,
        name: args.name.clone(),
        placeholders: args.placeholders.clone(),
        skip_install: args.skip_install,
    };
    let prompt: &dyn OverwritePrompt = if args.yes { &AssumeYes } else { &ConfirmPrompt };

    match builder.create(&tree, &request, prompt, &reporter).await? {
        Outcome::Aborted => {
            cliclack::outro_cancel("Destination left untouched.")?;
            Ok(())
        }
        Outcome::Created { summary, install } => finish(config, &builder, &summary, install),
    }
}

fn resolve_directory(directory: &Path) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().context("Failed to read current directory")?;

    if directory.as_os_str().is_empty() || directory == Path::new(".") {
        return Ok(current_dir);
    }

    Ok(if directory.is_absolute() {
        directory.to_path_buf()
    } else {
        current_dir.join(directory)
    })
}

fn setup_source<C: ProductConfig>(
    config: &C,
    template_dir: &Option<PathBuf>,
) -> Result<TemplateSource> {
    let source = match template_dir {
        Some(path) => TemplateSource::Local(path.clone()),
        None => TemplateSource::from_config(config)?,
    };

    match &source {
        TemplateSource::Bundled(_) => cliclack::log::info("Using bundled templates")?,
        TemplateSource::Local(path) => {
            cliclack::log::info(format!("Using local templates from {}", path.display()))?
        }
        TemplateSource::Remote(url) => {
            cliclack::log::info(format!("Using remote templates from {url}"))?
        }
    }

    Ok(source)
}

fn finish<C: ProductConfig>(
    config: &C,
    builder: &ProjectBuilder,
    summary: &ProjectSummary,
    install: Option<InstallResult>,
) -> Result<()> {
    let command = builder.installer().command_line();
    let dir = summary.dir.display();

    match install {
        Some(InstallResult::ToolMissing) => {
            cliclack::outro_cancel(format!(
                "Project files are ready in {dir}, but '{}' is not installed.",
                builder.installer().tool()
            ))?;
            anyhow::bail!(
                "'{}' was not found. Install it ({}), then run `{}` in {}",
                builder.installer().tool(),
                config.install_docs_url(),
                command,
                dir
            );
        }
        Some(InstallResult::NonZeroExit(code)) => {
            cliclack::outro_cancel(format!("Project files are ready in {dir}."))?;
            anyhow::bail!(
                "`{}` failed with exit code {}. Fix the problem above and re-run it in {}",
                command,
                code,
                dir
            );
        }
        Some(InstallResult::Success) | None => {
            cliclack::log::success(format!(
                "Created {} files in {}",
                summary.files.len() + 1,
                dir
            ))?;
            print_next_steps(config, &summary.dir, install.is_none(), &command)?;
            Ok(())
        }
    }
}

fn print_next_steps<C: ProductConfig>(
    config: &C,
    project_dir: &Path,
    install_skipped: bool,
    install_command: &str,
) -> Result<()> {
    let mut steps = config.next_steps(project_dir);
    if install_skipped {
        let at = usize::from(steps.first().is_some_and(|s| s.starts_with("cd ")));
        steps.insert(at, install_command.to_string());
    }

    println!();
    println!("  {}", "Next steps".bold());
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step.cyan());
    }

    cliclack::outro("Happy hacking!")?;

    Ok(())
}
