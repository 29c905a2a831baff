//! Terminal colours shared by the chat loop, login flow and `status` report.

use console::{StyledObject, style};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Ok,
    Failure,
    Title,
    Muted,
    Warning,
    Highlight,
    Bullet,
    Link,
    You,
    Agent,
}

fn paint<D: Display>(tone: Tone, text: D) -> String {
    let styled: StyledObject<D> = style(text);
    let styled = match tone {
        Tone::Ok => styled.green().bold(),
        Tone::Failure => styled.red().bold(),
        Tone::Title => styled.white().bold(),
        Tone::Muted => styled.dim(),
        Tone::Warning => styled.yellow(),
        Tone::Highlight => styled.green(),
        Tone::Bullet => styled.cyan().bold(),
        Tone::Link => styled.cyan().underlined(),
        Tone::You => styled.blue().bold(),
        Tone::Agent => styled.yellow().bold(),
    };
    styled.to_string()
}

pub fn ok<D: Display>(text: D) -> String {
    paint(Tone::Ok, text)
}

pub fn failure<D: Display>(text: D) -> String {
    paint(Tone::Failure, text)
}

pub fn title<D: Display>(text: D) -> String {
    paint(Tone::Title, text)
}

/// Hints, tool traffic and other secondary output.
pub fn muted<D: Display>(text: D) -> String {
    paint(Tone::Muted, text)
}

pub fn warning<D: Display>(text: D) -> String {
    paint(Tone::Warning, text)
}

/// Paths, provider names and other confirmed values.
pub fn highlight<D: Display>(text: D) -> String {
    paint(Tone::Highlight, text)
}

pub fn bullet<D: Display>(text: D) -> String {
    paint(Tone::Bullet, text)
}

pub fn link<D: Display>(text: D) -> String {
    paint(Tone::Link, text)
}

/// Prompt label for the person typing.
pub fn you<D: Display>(text: D) -> String {
    paint(Tone::You, text)
}

/// Label printed before each assistant reply.
pub fn agent<D: Display>(text: D) -> String {
    paint(Tone::Agent, text)
}
