use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use dungeongen::config::{Config, KEYS};

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_or_default();
            config.set(&key, &value)?;
            let path = config.save()?;
            println!(
                "{} {key} = {value} {}",
                "Set".green(),
                format!("({})", path.display()).dimmed()
            );
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", Config::path()?.display());
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();
    let effective = config.generation_config();
    let layout_type = config.layout_type().unwrap_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "  (not created yet, showing defaults)".dimmed());
    }
    println!();
    println!("{}", "generation".bold());
    println!("  margin:         {}", effective.margin);
    println!("  min_separation: {}", effective.sampler.min_separation);
    println!("  loop_ratio:     {}", effective.connectivity.loop_ratio);
    println!("  layout_type:    {layout_type}");
    println!("  padding:        {}", effective.routing.padding);
    println!("  spring:         {}", effective.spring.enabled);
    println!();
    println!("{} {}", "Keys:".dimmed(), KEYS.join(", ").dimmed());
    Ok(())
}
