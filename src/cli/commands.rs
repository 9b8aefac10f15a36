//! Command dispatch: one handler per subcommand.

use std::path::Path;

use tracing::{debug, instrument};

use crate::application::FormatKind;
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::render_forest;
use crate::config::{global_config_path, Settings};
use crate::domain::{
    self, classify, validate_target, Attribute, MovePosition, Node, NodePath, Point, TargetBox,
    Tree,
};
use crate::exitcode;
use crate::infrastructure::{InfraError, ServiceContainer};

/// Run the parsed command line; returns the process exit code.
pub fn execute(cli: &Cli) -> CliResult<i32> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };
    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);
    execute_with(&container, cli.format, command)
}

/// Run `command` against an already wired container.
pub fn execute_with(
    container: &ServiceContainer,
    format: Option<FormatKind>,
    command: &Commands,
) -> CliResult<i32> {
    let ctx = Context { container, format };
    match command {
        Commands::Show { file } => ctx.show(file),
        Commands::Paths { file } => ctx.paths(file),
        Commands::Next { file, path } => ctx.step(file, path, domain::next),
        Commands::Prev { file, path } => ctx.step(file, path, domain::previous),
        Commands::Set {
            file,
            path,
            key,
            value,
            output,
        } => {
            let attribute = Attribute::parse(key, value)?;
            ctx.edit(file, output, |tree| domain::set_attribute(tree, path, attribute))
        }
        Commands::Insert {
            file,
            index,
            title,
            parent,
            output,
        } => ctx.edit(file, output, |tree| {
            domain::insert_node(tree, parent.as_ref(), *index, Node::new(title.as_str()))
        }),
        Commands::Delete { file, path, output } => {
            ctx.edit(file, output, |tree| domain::delete_node(tree, path))
        }
        Commands::Move {
            file,
            source,
            target,
            position,
            output,
        } => ctx.edit(file, output, |tree| {
            domain::move_node(tree, source, target, *position)
        }),
        Commands::Classify {
            x,
            y,
            left,
            top,
            width,
            height,
            zone_width,
        } => ctx.classify(
            Point { x: *x, y: *y },
            TargetBox {
                left: *left,
                top: *top,
                width: *width,
                height: *height,
            },
            *zone_width,
        ),
        Commands::CheckMove { source, target } => Ok(check_move(source, target)),
        Commands::Convert {
            input,
            output,
            from,
            to,
        } => ctx.convert(input, output, *from, *to),
        Commands::Config { command } => ctx.config(command),
        Commands::Completion { .. } => Err(CliError::Usage(
            "completion is handled before configuration is loaded".to_string(),
        )),
    }
}

struct Context<'a> {
    container: &'a ServiceContainer,
    format: Option<FormatKind>,
}

impl Context<'_> {
    fn load(&self, file: &Path) -> CliResult<Tree> {
        Ok(self.container.documents.load(file, self.format)?)
    }

    #[instrument(level = "debug", skip(self))]
    fn show(&self, file: &Path) -> CliResult<i32> {
        let tree = self.load(file)?;
        print!("{}", render_forest(&tree));
        Ok(exitcode::OK)
    }

    fn paths(&self, file: &Path) -> CliResult<i32> {
        let tree = self.load(file)?;
        for (path, node) in tree.iter() {
            output::info(&format!("{}\t{}", path, node.title()));
        }
        Ok(exitcode::OK)
    }

    /// Prints the neighbour, or nothing with exit code 1 at a boundary.
    fn step(
        &self,
        file: &Path,
        path: &NodePath,
        step: fn(&Tree, &NodePath) -> Option<NodePath>,
    ) -> CliResult<i32> {
        let tree = self.load(file)?;
        if !tree.contains(path) {
            return Err(domain::DomainError::PathNotFound(path.clone()).into());
        }
        match step(&tree, path) {
            Some(neighbour) => {
                output::info(&neighbour);
                Ok(exitcode::OK)
            }
            None => {
                debug!("step: no neighbour for {}", path);
                Ok(exitcode::REJECTED)
            }
        }
    }

    /// Load, apply `op`, then emit the new document per `dest`.
    #[instrument(level = "debug", skip(self, op))]
    fn edit<F>(&self, file: &Path, dest: &OutputArgs, op: F) -> CliResult<i32>
    where
        F: FnOnce(&Tree) -> domain::DomainResult<Tree>,
    {
        let documents = &self.container.documents;
        let tree = self.load(file)?;
        let edited = op(&tree)?;

        if dest.in_place {
            documents.save(file, &edited, self.format)?;
            output::action("Updated", &file.display());
        } else if let Some(target) = &dest.output {
            documents.save(target, &edited, self.format)?;
            output::action("Wrote", &target.display());
        } else {
            let kind = documents.detect_format(file, self.format);
            let text = documents.render(&edited, kind)?;
            output::info(text.trim_end_matches('\n'));
        }
        Ok(exitcode::OK)
    }

    fn classify(
        &self,
        pointer: Point,
        target_box: TargetBox,
        zone_width: Option<f64>,
    ) -> CliResult<i32> {
        if target_box.width < 0.0 || target_box.height < 0.0 {
            return Err(CliError::InvalidArgs(
                "width and height must not be negative".to_string(),
            ));
        }
        let zone_width = zone_width.unwrap_or(self.container.settings.zone_width);
        let position: MovePosition = classify(pointer, &target_box, zone_width);
        output::info(&position);
        Ok(exitcode::OK)
    }

    fn convert(
        &self,
        input: &Path,
        output_path: &Path,
        from: Option<FormatKind>,
        to: Option<FormatKind>,
    ) -> CliResult<i32> {
        let documents = &self.container.documents;
        let tree = documents.load(input, from.or(self.format))?;
        let kind = documents.detect_format(output_path, to);
        documents.save(output_path, &tree, Some(kind))?;
        output::action(
            "Converted",
            &format!("{} -> {} ({})", input.display(), output_path.display(), kind),
        );
        Ok(exitcode::OK)
    }

    fn config(&self, command: &ConfigCommands) -> CliResult<i32> {
        match command {
            ConfigCommands::Show => {
                output::header("Effective configuration");
                print!("{}", self.container.settings.to_toml()?);
            }
            ConfigCommands::Path => match global_config_path() {
                Some(path) => {
                    let state = if self.container.fs.exists(&path) {
                        "exists"
                    } else {
                        "not found"
                    };
                    output::action("Global", &format!("{} ({})", path.display(), state));
                }
                None => output::warning("no config directory available on this platform"),
            },
            ConfigCommands::Init { force } => {
                let path = global_config_path().ok_or_else(|| {
                    CliError::Usage("no config directory available on this platform".to_string())
                })?;
                if self.container.fs.exists(&path) && !force {
                    return Err(CliError::Usage(format!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    )));
                }
                let fs = &self.container.fs;
                fs.ensure_parent(&path)
                    .map_err(|e| InfraError::io(format!("create {}", path.display()), e))?;
                fs.write(&path, &Settings::template())
                    .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
                output::success(&format!("Created {}", path.display()));
            }
        }
        Ok(exitcode::OK)
    }
}

fn check_move(source: &NodePath, target: &NodePath) -> i32 {
    if validate_target(source, target) {
        output::success(&format!("{} may be dropped on {}", source, target));
        exitcode::OK
    } else {
        output::failure(&format!(
            "{} cannot be dropped on itself or its descendant {}",
            source, target
        ));
        exitcode::REJECTED
    }
}
