use std::env;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};
use wfold_core::Strictness;
use wfold_installer::{
    codex_config_path, inspect, install, remove_collapse_setting, uninstall, ExtensionLayout,
    InstallOptions, UninstallOptions,
};
use wfold_resolver::{read_package_version, resolve_target, user_home_dir, Candidate};

use crate::completion::write_completions_script;
use crate::config::{load_config, FoldConfig};
use crate::manual::download_manual;
use crate::render::{
    current_output_style, format_inspect_lines, format_install_lines, format_target_line,
    format_uninstall_lines, render_status_line, OutputStyle,
};
use crate::{Cli, Commands, TargetArgs};

struct RunContext {
    config: FoldConfig,
    home: PathBuf,
    style: OutputStyle,
}

impl RunContext {
    fn load(cli_config: Option<&Path>) -> Result<Self> {
        let home = user_home_dir()?;
        let config = load_config(cli_config, &home)?;
        debug!(?config, "loaded configuration");
        Ok(Self {
            config,
            home,
            style: current_output_style(),
        })
    }

    fn resolve(&self, target: &TargetArgs) -> Result<(Candidate, ExtensionLayout, Strictness)> {
        let strictness = self.config.strictness(target.lenient);
        let roots = self.config.extension_roots(&self.home);
        let candidate = resolve_target(&roots, target.ext_dir.as_deref(), strictness)?;
        println!("{}", format_target_line(self.style, &candidate));
        let layout = ExtensionLayout::new(candidate.dir.clone());
        Ok((candidate, layout, strictness))
    }

    fn print_lines(&self, lines: &[String]) {
        for line in lines {
            println!("{line}");
        }
    }
}

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        return write_completions_script(shell, &mut io::stdout());
    }

    let ctx = RunContext::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Install {
            target,
            dry_run,
            no_manual,
        } => {
            let (_, layout, strictness) = ctx.resolve(&target)?;
            let report = install(&layout, strictness, InstallOptions { dry_run })?;
            ctx.print_lines(&format_install_lines(&report, ctx.style));
            if !dry_run && !no_manual && ctx.config.download_manual {
                fetch_manual_best_effort(&ctx);
            }
        }
        Commands::Uninstall {
            target,
            keep_backups,
            keep_config,
        } => {
            let (_, layout, strictness) = ctx.resolve(&target)?;
            let report = uninstall(&layout, strictness, UninstallOptions { keep_backups })?;
            ctx.print_lines(&format_uninstall_lines(&report, ctx.style));
            if !keep_config {
                clean_codex_config(&ctx);
            }
        }
        Commands::Inspect { target } => {
            let (candidate, layout, strictness) = ctx.resolve(&target)?;
            let report = inspect(&layout, strictness)?;
            let package_version = read_package_version(&candidate.dir);
            ctx.print_lines(&format_inspect_lines(
                &candidate,
                package_version.as_ref(),
                &report,
                ctx.style,
            ));
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn fetch_manual_best_effort(ctx: &RunContext) {
    let cwd = env::current_dir().ok();
    let dirs = ctx.config.manual_dirs(&ctx.home, cwd.as_deref());
    match download_manual(&ctx.config.manual_url, &dirs, ctx.style) {
        Ok(path) => println!(
            "{}",
            render_status_line(
                ctx.style,
                "ok",
                &format!("manual saved: {}", path.display())
            )
        ),
        Err(err) => {
            warn!("operator manual download failed: {err:#}");
            println!(
                "{}",
                render_status_line(
                    ctx.style,
                    "warn",
                    &format!("manual: {}", ctx.config.manual_url)
                )
            );
        }
    }
}

fn clean_codex_config(ctx: &RunContext) {
    let path = codex_config_path(&ctx.home);
    match remove_collapse_setting(&path) {
        Ok(true) => println!(
            "{}",
            render_status_line(
                ctx.style,
                "ok",
                &format!(
                    "removed codex.workflow.collapseByDefault from {}",
                    path.display()
                )
            )
        ),
        Ok(false) => debug!(path = %path.display(), "no collapse setting to remove"),
        Err(err) => warn!("could not clean {}: {err:#}", path.display()),
    }
}
