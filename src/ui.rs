//! Terminal rendering of a gist.

use crate::summary::{GistResult, Structure};
use colored::Colorize;
use std::fmt::Write;

/// Render a gist as a coloured report
pub fn render(gist: &GistResult) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_report(&mut out, gist);
    out
}

fn write_report(out: &mut String, gist: &GistResult) -> std::fmt::Result {
    writeln!(out, "=== {} ===", gist.title.bold())?;
    let source = gist.source_url.as_deref().unwrap_or("pasted text");
    writeln!(
        out,
        "{} · {} words · {}\n",
        gist.source_type,
        gist.word_count,
        source.dimmed()
    )?;

    writeln!(out, "💡 {}", "Core:".bold())?;
    writeln!(out, "  {}\n", gist.core)?;

    for layer in &gist.layers {
        writeln!(
            out,
            "📄 {} {}",
            layer.title.bold(),
            format!("(depth {})", layer.depth).dimmed()
        )?;
        writeln!(out, "  {}\n", layer.content)?;
    }

    match &gist.structure {
        Structure::Story(story) => {
            writeln!(out, "📖 {}", "Story".bold().underline())?;
            section(out, "📍 Situation", &story.situation)?;
            section(out, "⚡ Complication", &story.complication)?;
            section(out, "❓ Question", &story.question)?;
            section(out, "✅ Resolution", &story.resolution)?;
        }
        Structure::Argument(argument) => {
            writeln!(out, "⚖️  {}", "Argument".bold().underline())?;
            section(out, "💡 Thesis", &argument.thesis)?;
            if !argument.evidence.is_empty() {
                writeln!(out, "{}", "📊 Evidence:".cyan())?;
                for point in &argument.evidence {
                    writeln!(out, "  • {}", point)?;
                }
                writeln!(out)?;
            }
            section(out, "⚖️  Counter-Argument", &argument.counter_argument)?;
            section(out, "🧩 Synthesis", &argument.synthesis)?;
        }
    }

    writeln!(out, "🎯 {}", "Counter-Argument:".red().bold())?;
    writeln!(out, "  {}\n", gist.counter_argument)?;
    writeln!(out, "💪 {}", "Steelman:".green().bold())?;
    writeln!(out, "  {}", gist.steelman)?;
    Ok(())
}

fn section(out: &mut String, heading: &str, body: &str) -> std::fmt::Result {
    writeln!(out, "{}", format!("{heading}:").cyan())?;
    writeln!(out, "  {}\n", body)
}
