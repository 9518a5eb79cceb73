//! Contributor reconciliation. Every article names its contributor by a raw
//! string; this module binds each one to exactly one [`Registry`] entry,
//! walking the operator through creating or updating profiles on the way.
//!
//! The work happens in three steps so the registry is only touched once:
//!
//! 1. [`match_contributors`] takes a snapshot of which references are already
//!    known and which need a new profile. Ambiguous registry entries abort the
//!    run here, before any question is asked.
//! 2. [`review`] drives the per-contributor [`Stage`] machine against a
//!    [`Prompter`].
//! 3. [`Registry::merge`] folds the reviewed profiles back into the registry,
//!    which the caller then saves.
//!
//! [`bind_articles`] and [`find_blog_author`] resolve references against the
//! merged registry afterwards.

use crate::article::{Article, ResolvedArticle};
use crate::contributor::{same_name, Contributor, Field, Registry};
use crate::prompt::{self, Prompter};
use std::fmt;
use tracing::{debug, info};

/// Where a single contributor is in the review workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Decide which review applies.
    Match,
    /// First pass over a contributor missing from the registry: every field
    /// is asked for.
    ReviewNew,
    /// First pass over a known contributor: the operator picks which fields
    /// to update.
    ReviewExisting,
    /// Any pass after a rejected summary: the operator picks fields again.
    ReviewMultipass,
    /// Show the summary and ask whether it's right.
    Confirm,
    Done,
}

/// Finds the registry entry for every distinct contributor reference in
/// `articles`, or a new stub where there is none. References that compare
/// equal under [`same_name`] share one entry, in order of first appearance.
pub fn match_contributors(articles: &[Article], registry: &Registry) -> Result<Vec<Contributor>> {
    let mut matched: Vec<Contributor> = Vec::new();
    for article in articles {
        let raw = &article.contributor;
        if matched.iter().any(|c| same_name(&c.name, raw)) {
            continue;
        }
        let found = registry.find(raw);
        match found.as_slice() {
            [] => {
                debug!(contributor = %raw.trim(), "no registry entry, creating stub");
                matched.push(Contributor::new_stub(raw));
            }
            [i] => {
                let mut contributor = registry.contributors[*i].clone();
                contributor.is_new = false;
                matched.push(contributor);
            }
            many => {
                return Err(Error::AmbiguousRegistry {
                    name: raw.trim().to_owned(),
                    matches: many
                        .iter()
                        .map(|&i| registry.contributors[i].name.clone())
                        .collect(),
                })
            }
        }
    }
    Ok(matched)
}

/// Runs the review workflow for one contributor until the operator confirms
/// the result.
pub fn review(contributor: &mut Contributor, prompter: &mut dyn Prompter) -> Result<()> {
    let mut stage = Stage::Match;
    while stage != Stage::Done {
        stage = step(stage, contributor, prompter)?;
    }
    Ok(())
}

/// Performs one transition of the review [`Stage`] machine.
pub fn step(
    stage: Stage,
    contributor: &mut Contributor,
    prompter: &mut dyn Prompter,
) -> Result<Stage> {
    Ok(match stage {
        Stage::Match if contributor.is_new => Stage::ReviewNew,
        Stage::Match => Stage::ReviewExisting,
        Stage::ReviewNew => {
            prompter.say(&format!(
                "\noh my... this looks like a new contributor named - {}. let me get their details from you.\n",
                contributor.name
            ));
            ask_fields(contributor, &Field::ALL, prompter)?;
            Stage::Confirm
        }
        Stage::ReviewExisting => {
            prompter.say(&format!(
                "\n¡que suerte! {} is already in the contributors file\n\tcurrent data:\n{}",
                contributor.name,
                contributor.summary()
            ));
            let fields = choose_fields(prompter)?;
            ask_fields(contributor, &fields, prompter)?;
            Stage::Confirm
        }
        Stage::ReviewMultipass => {
            let fields = choose_fields(prompter)?;
            ask_fields(contributor, &fields, prompter)?;
            Stage::Confirm
        }
        Stage::Confirm => {
            let message = format!("does all this look correct?\n{}", contributor.summary());
            if prompter.confirm(&message)? {
                Stage::Done
            } else {
                Stage::ReviewMultipass
            }
        }
        Stage::Done => Stage::Done,
    })
}

fn choose_fields(prompter: &mut dyn Prompter) -> Result<Vec<Field>> {
    let items: Vec<String> = Field::ALL.iter().map(|f| f.to_string()).collect();
    let defaults: Vec<bool> = Field::ALL.iter().map(|f| *f == Field::Wittycism).collect();
    let picked = prompter.checklist("would you like to update any data?", &items, &defaults)?;
    Ok(picked.into_iter().map(|i| Field::ALL[i]).collect())
}

fn ask_fields(
    contributor: &mut Contributor,
    fields: &[Field],
    prompter: &mut dyn Prompter,
) -> Result<()> {
    for &field in fields {
        let answer = prompter.input(&question(field, contributor.field(field)))?;
        contributor.set_field(field, &answer);
    }
    Ok(())
}

fn question(field: Field, current: Option<&str>) -> String {
    let current = current.unwrap_or("none");
    match field {
        Field::Wittycism => format!(
            "a clever wittycism for this fine contributor (current value = {})?",
            current
        ),
        Field::Url => format!(
            "where can i find out more about this contributor (url, current value = {})?",
            current
        ),
        Field::Headshot => format!(
            "lets see that gorgeous face (picture location, current value = {})?",
            current
        ),
        Field::Twitter => format!(
            "under which name do they tweet (twitter handle, current value = {})?",
            current
        ),
    }
}

/// Matches, reviews and merges the contributors of `articles` into
/// `registry`. Returns the reviewed contributors in order of first
/// appearance. Saving the registry is left to the caller.
pub fn reconcile(
    articles: &[Article],
    registry: &mut Registry,
    prompter: &mut dyn Prompter,
) -> Result<Vec<Contributor>> {
    let mut pending = match_contributors(articles, registry)?;
    info!(
        contributors = pending.len(),
        new = pending.iter().filter(|c| c.is_new).count(),
        "reviewing contributors"
    );
    prompter.say(
        "\n\nnow we will loop through the designated contributors in your chosen articles, \
         giving you the opportunity to update or provide data about them as necessary\n",
    );
    for contributor in pending.iter_mut() {
        review(contributor, prompter)?;
    }
    registry.merge(&pending);
    Ok(pending)
}

/// Binds every article to its single registry entry.
pub fn bind_articles(articles: Vec<Article>, registry: &Registry) -> Result<Vec<ResolvedArticle>> {
    articles
        .into_iter()
        .map(|article| {
            let found = registry.find(&article.contributor);
            match found.as_slice() {
                [i] => {
                    let contributor = registry.contributors[*i].clone();
                    Ok(article.resolve(contributor))
                }
                _ => Err(Error::AmbiguousMatch {
                    subject: Subject::Contributor,
                    name: article.contributor.clone(),
                    count: found.len(),
                }),
            }
        })
        .collect()
}

/// Finds the author of the post by exact name.
pub fn find_blog_author(name: &str, registry: &Registry) -> Result<Contributor> {
    let found: Vec<&Contributor> = registry
        .contributors
        .iter()
        .filter(|c| c.name == name)
        .collect();
    match found.as_slice() {
        [author] => Ok((*author).clone()),
        _ => Err(Error::AmbiguousMatch {
            subject: Subject::BlogAuthor,
            name: name.to_owned(),
            count: found.len(),
        }),
    }
}

/// What an [`Error::AmbiguousMatch`] was looking for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subject {
    Contributor,
    BlogAuthor,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Subject::Contributor => "contributor",
            Subject::BlogAuthor => "blog author",
        })
    }
}

/// The result of a reconciliation step.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a reconciliation failure.
#[derive(Debug)]
pub enum Error {
    /// Returned when a reference doesn't resolve to exactly one contributor.
    AmbiguousMatch {
        subject: Subject,
        name: String,
        count: usize,
    },

    /// Returned when several registry entries match one article reference.
    AmbiguousRegistry { name: String, matches: Vec<String> },

    /// Returned when the operator couldn't be asked.
    Prompt(prompt::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::AmbiguousMatch {
                subject,
                name,
                count: 0,
            } => write!(
                f,
                "No matching {} could be found in the contributors file for `{}`",
                subject, name
            ),
            Error::AmbiguousMatch {
                subject,
                name,
                count,
            } => write!(
                f,
                "{} entries in the contributors file match {} `{}`; names must be unique",
                count, subject, name
            ),
            Error::AmbiguousRegistry { name, matches } => write!(
                f,
                "More than one contributor matches `{}` ({}); correct the contributors file",
                name,
                matches.join(", ")
            ),
            Error::Prompt(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::AmbiguousMatch { .. } => None,
            Error::AmbiguousRegistry { .. } => None,
            Error::Prompt(err) => Some(err),
        }
    }
}

impl From<prompt::Error> for Error {
    fn from(err: prompt::Error) -> Error {
        Error::Prompt(err)
    }
}
