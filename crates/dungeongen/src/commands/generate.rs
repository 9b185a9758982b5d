use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::GenerateArgs;
use dungeongen::config::Config;
use dungeongen::generator::{GenerationReport, ReportError};
use dungeongen::layout::routing::HallwayStats;
use dungeongen::{
    ContentSource, GenerationOptions, Generator, Guidelines, JsonFileSource,
};

/// Run the generate command.
pub fn run(args: GenerateArgs, quiet: bool) -> Result<()> {
    let config = Config::load_or_default();
    let guidelines = guidelines_from(&args, &config);

    let mut gen_config = config.generation_config();
    if let Some(margin) = args.margin {
        gen_config.margin = margin;
    }
    if let Some(sep) = args.separation {
        gen_config.sampler.min_separation = sep;
    }

    let source = args.content.as_ref().map(JsonFileSource::new);
    let options = GenerationOptions {
        include_contents: source.is_some(),
        seed: args.seed,
    };

    let report = Generator::new(gen_config).run(
        &guidelines,
        &options,
        source.as_ref().map(|s| s as &dyn ContentSource),
    );

    let json = if args.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !quiet {
                eprintln!(
                    "{}",
                    format!("Wrote {} to {}", report.dungeon.name, path.display()).green()
                );
            }
        }
        None => println!("{json}"),
    }

    if args.summary && !quiet {
        print_summary(&report);
    }

    if !report.is_success() {
        anyhow::bail!("{}", first_error(&report));
    }
    Ok(())
}

fn guidelines_from(args: &GenerateArgs, config: &Config) -> Guidelines {
    let mut guidelines = args
        .prompt
        .as_deref()
        .map(Guidelines::from_prompt)
        .unwrap_or_default();
    if let Some(rooms) = args.rooms {
        guidelines.room_count = rooms;
    }
    if let Some(layout_type) = args.layout_type.or(config.layout_type()) {
        guidelines.layout_type = layout_type;
    }
    if let Some(theme) = &args.theme {
        guidelines.theme = theme.clone();
    }
    if let Some(atmosphere) = &args.atmosphere {
        guidelines.atmosphere = atmosphere.clone();
    }
    guidelines
}

fn first_error(report: &GenerationReport) -> String {
    match report.errors.first() {
        Some(ReportError::Message(message)) => message.clone(),
        Some(ReportError::Categorized { message, .. }) => message.clone(),
        None => "Generation failed".to_string(),
    }
}

fn print_summary(report: &GenerationReport) {
    let layout = &report.dungeon;
    let stats = HallwayStats::from_corridors(&layout.corridors);

    eprintln!();
    eprintln!("{}", layout.name.bold());
    eprintln!(
        "  {} rooms, {} connections, {} corridors ({} cells)",
        layout.rooms.len(),
        layout.connections.len(),
        layout.corridors.len(),
        stats.total_length
    );
    eprintln!(
        "  viewport {}x{} from ({}, {})",
        layout.viewport.width(),
        layout.viewport.height(),
        layout.viewport.min_x,
        layout.viewport.min_y
    );

    for room in &layout.rooms {
        let mut tags = Vec::new();
        if room.flags.is_entrance {
            tags.push("entrance".cyan().to_string());
        }
        if room.flags.is_boss_room {
            tags.push("boss".red().to_string());
        }
        if room.flags.is_treasure_vault {
            tags.push("vault".yellow().to_string());
        }
        for (set, label) in [
            (room.flags.has_traps, "traps"),
            (room.flags.has_treasure, "treasure"),
            (room.flags.has_monsters, "monsters"),
        ] {
            if set {
                tags.push(label.dimmed().to_string());
            }
        }
        eprintln!(
            "  {:<10} {:>3}x{:<3} at {:<10} {}",
            room.display_name(),
            room.width,
            room.height,
            room.anchor.to_string(),
            tags.join(" ")
        );
    }

    if !stats.type_distribution.is_empty() {
        let kinds: Vec<String> = stats
            .type_distribution
            .iter()
            .map(|(kind, count)| format!("{kind} x{count}"))
            .collect();
        eprintln!("  hallways: {}", kinds.join(", "));
    }

    for error in &report.errors {
        let text = match error {
            ReportError::Message(message) => message.clone(),
            ReportError::Categorized { error, message } => format!("{error}: {message}"),
        };
        eprintln!("  {} {text}", "warning:".yellow());
    }
}
