use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, success, warning};
use std::process::Command;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        edit_config,
        editor,
    } = cmd
    {
        if *print_config {
            let yaml = serde_yaml::to_string(cfg)
                .map_err(|e| AppError::Config(format!("cannot serialize configuration: {e}")))?;
            println!("📄 Current configuration:\n");
            println!("{yaml}");
        }

        if *edit_config {
            let path = Config::config_file();
            if !path.exists() {
                cfg.save_to(&path)?;
            }

            let default_editor = std::env::var("EDITOR")
                .or_else(|_| std::env::var("VISUAL"))
                .unwrap_or_else(|_| {
                    if cfg!(target_os = "windows") {
                        "notepad".to_string()
                    } else {
                        "nano".to_string()
                    }
                });

            let editor_to_use = editor.clone().unwrap_or_else(|| default_editor.clone());

            match Command::new(&editor_to_use).arg(&path).status() {
                Ok(s) if s.success() => {
                    success(format!("Configuration edited with '{editor_to_use}'"));
                }
                _ => {
                    warning(format!(
                        "Editor '{editor_to_use}' not available, falling back to '{default_editor}'"
                    ));
                    match Command::new(&default_editor).arg(&path).status() {
                        Ok(s) if s.success() => {
                            success(format!("Configuration edited with '{default_editor}'"));
                        }
                        _ => error(format!(
                            "Failed to edit configuration with '{default_editor}'"
                        )),
                    }
                }
            }

            // reject an edit that leaves the file unusable
            Config::load_from(&path)?.validate()?;
        }
    }

    Ok(())
}
