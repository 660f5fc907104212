//! Text Rendering
//!
//! ASCII art picked by look and mood, a framed header, meter bars and a mood
//! sentence. Everything is measured in terminal columns (`unicode-width`), so
//! names with wide characters still line up.

use gitpet_core::{EvolutionEvent, Meter, Mood, PetState};
use unicode_width::UnicodeWidthStr;

/// Cells in a meter bar
const BAR_WIDTH: usize = 20;

/// Placeholder for the eyes in art templates
const EYES: &str = "{e}";

// =============================================================================
// Art
// =============================================================================

const CAT: &[&str] = &[r" /\_/\ ", r"( {e} )", r" > ^ < "];

const FOX: &[&str] = &[r"/\   /\", r"\ {e} /", r" \ v / ", r"  \_/  "];

const BLOB: &[&str] = &[r"  .---.  ", r" ( {e} ) ", r"(_______)"];

/// Art template for a look; unknown looks fall back to the cat
fn template(look: &str) -> &'static [&'static str] {
    match look {
        "fox" => FOX,
        "blob" => BLOB,
        _ => CAT,
    }
}

fn eyes(mood: Mood) -> &'static str {
    match mood {
        Mood::Ecstatic => "^.^",
        Mood::Content => "o.o",
        Mood::Bored => "-.-",
        Mood::Exhausted => "=.=",
        Mood::Starving => "O.O",
    }
}

/// Art lines for a pet in its current mood
pub fn art(look: &str, mood: Mood) -> Vec<String> {
    template(look)
        .iter()
        .map(|line| line.replace(EYES, eyes(mood)))
        .collect()
}

// =============================================================================
// Card
// =============================================================================

/// Pad `text` with spaces to `width` columns, centered
fn center(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    if used >= width {
        return text.to_string();
    }
    let left = (width - used) / 2;
    let right = width - used - left;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

/// Pad `text` with spaces to `width` columns, left aligned
fn pad(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{text}{}", " ".repeat(width.saturating_sub(used)))
}

/// One meter as `label [#####-----] value/max`
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn meter_bar(label: &str, meter: &Meter) -> String {
    let filled = ((meter.fraction() * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!(
        "{label:<10} [{}{}] {:>5.1}/{:.0}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        meter.value(),
        meter.max()
    )
}

/// Sentence describing the pet's mood
pub fn mood_sentence(pet: &PetState) -> String {
    let name = pet.name();
    match pet.mood() {
        Mood::Starving => format!("{name} is starving! Commit something to feed them."),
        Mood::Exhausted => {
            format!("{name} is worn out from all those file changes. Maybe a nap would help.")
        }
        Mood::Bored => format!("{name} is bored. Write some fresh code to cheer them up."),
        Mood::Content => format!("{name} is content and keeps an eye on your commits."),
        Mood::Ecstatic => format!("{name} is ecstatic! Life in this repository is good."),
    }
}

/// Full status card: framed header and art, meters, and a wrapped mood
/// sentence
pub fn pet_card(pet: &PetState, width: usize) -> String {
    let title = format!(" {} · stage {} ", pet.name(), pet.evolution_stage());
    let art = art(pet.look(), pet.mood());

    let inner = art
        .iter()
        .map(|line| UnicodeWidthStr::width(line.as_str()))
        .chain(std::iter::once(UnicodeWidthStr::width(title.as_str())))
        .max()
        .unwrap_or(0)
        + 4;

    let mut out = String::new();
    out.push('╭');
    out.push_str(&center_rule(&title, inner));
    out.push_str("╮\n");
    for line in &art {
        out.push('│');
        out.push_str(&center(line, inner));
        out.push_str("│\n");
    }
    out.push('╰');
    out.push_str(&"─".repeat(inner));
    out.push_str("╯\n");

    out.push_str(&meter_bar("food", pet.food()));
    out.push('\n');
    out.push_str(&meter_bar("energy", pet.energy()));
    out.push('\n');
    out.push_str(&meter_bar("excitement", pet.excitement()));
    out.push('\n');

    if let Some(progress) = pet.evolution_progress() {
        out.push_str(&format!(
            "{} {:.1} days until stage {}\n",
            pad("evolution", 10),
            progress.days_needed,
            progress.target_stage
        ));
    }

    out.push('\n');
    out.push_str(&textwrap::fill(&mood_sentence(pet), width));
    out.push('\n');
    out
}

/// `title` centered in a horizontal rule `width` columns wide
fn center_rule(title: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(title);
    let left = width.saturating_sub(used) / 2;
    let right = width.saturating_sub(used + left);
    format!("{}{title}{}", "─".repeat(left), "─".repeat(right))
}

// =============================================================================
// Messages
// =============================================================================

/// Banner shown when a catch-up reached a new stage
pub fn evolution_banner(name: &str, event: &EvolutionEvent, width: usize) -> String {
    let text = if event.stages_gained() > 1 {
        format!(
            "*** {name} evolved {} times while you were away and reached stage {}! ***",
            event.stages_gained(),
            event.to_stage
        )
    } else {
        format!("*** {name} evolved to stage {}! ***", event.to_stage)
    };
    let mut out = textwrap::fill(&text, width);
    out.push('\n');
    out
}

/// Reaction to being petted
pub fn pet_reaction(pet: &PetState) -> String {
    let sound = match pet.look() {
        "fox" => "It yips and wags its tail.",
        "blob" => "It wobbles contentedly.",
        _ => "It purrs happily.",
    };
    format!("You pet {}. {sound}", pet.name())
}

/// Reaction to a nap
pub fn nap_reaction(pet: &PetState) -> String {
    format!(
        "{} curls up for a nap and wakes with {:.0}/{:.0} energy.",
        pet.name(),
        pet.energy().value(),
        pet.energy().max()
    )
}
