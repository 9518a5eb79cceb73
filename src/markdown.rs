//! The Markdown field transformer. Source documents are walked as generic
//! [`serde_yaml::Value`] trees before they are converted into typed records,
//! and only the values of designated keys are rendered from Markdown to HTML.

use pulldown_cmark::{html, Event, Options, Parser};
use serde_yaml::{Mapping, Value};

/// Renders `markdown` to HTML and strips the outer block element, so a short
/// paragraph comes back as an inline fragment (`Hello *there*` becomes
/// `Hello <em>there</em>`) suitable for dropping into a template sentence.
/// Text that renders to more than one top-level block keeps all its tags.
pub fn to_fragment(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let events: Vec<Event> = Parser::new_ext(markdown, options).collect();
    let mut out = String::new();
    html::push_html(&mut out, strip_outer_block(&events).iter().cloned());
    out.trim_end().to_owned()
}

/// Returns the events inside the wrapping block when `events` hold exactly
/// one top-level block, and all of `events` otherwise.
fn strip_outer_block<'a, 'e>(events: &'a [Event<'e>]) -> &'a [Event<'e>] {
    if top_level_blocks(events) != 1 {
        return events;
    }
    match (events.first(), events.last()) {
        (Some(Event::Start(open)), Some(Event::End(close))) if open == close => {
            &events[1..events.len() - 1]
        }
        _ => events,
    }
}

// Counts events that sit at nesting depth zero, treating a Start..End pair as
// one block.
fn top_level_blocks(events: &[Event]) -> usize {
    let mut depth = 0usize;
    let mut blocks = 0;
    for event in events {
        match event {
            Event::Start(_) => {
                if depth == 0 {
                    blocks += 1;
                }
                depth += 1;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            _ if depth == 0 => blocks += 1,
            _ => {}
        }
    }
    blocks
}

/// Returns a copy of `tree` where every string reached through one of
/// `fields` (at any depth) is replaced by its [`to_fragment`] rendering.
/// Sequence elements are visited without key context, so a designated key is
/// only honored on the mapping that holds it.
pub fn mark_down_fields<S: AsRef<str>>(tree: Value, fields: &[S]) -> Value {
    match tree {
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .into_iter()
                .map(|(key, value)| {
                    let designated = key
                        .as_str()
                        .map_or(false, |k| fields.iter().any(|f| f.as_ref() == k));
                    let value = match value {
                        Value::String(s) if designated => Value::String(to_fragment(&s)),
                        other => mark_down_fields(other, fields),
                    };
                    (key, value)
                })
                .collect::<Mapping>(),
        ),
        Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| mark_down_fields(item, fields))
                .collect(),
        ),
        leaf => leaf,
    }
}
