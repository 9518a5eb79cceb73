//! Exports the [`build_post`] function which stitches together the steps of
//! one run: loading the articles ([`crate::source`]), reconciling their
//! contributors ([`crate::reconcile`]), rendering the template
//! ([`crate::render`]), rewriting anchors ([`crate::anchors`]) and writing
//! the output file.
//!
//! Every input that can be checked without the operator is loaded and parsed
//! before the first question is asked, so a missing template or a broken
//! standard content file never costs a reconciliation session. The registry
//! is written once, after the post has been rendered, so a failed run leaves
//! it as it was.

use crate::anchors::{self, Error as AnchorsError};
use crate::config::Config;
use crate::contributor::{Error as RegistryError, Registry};
use crate::prompt::Prompter;
use crate::reconcile::{self, Error as ReconcileError};
use crate::render::{self, Error as RenderError, RenderContext, Renderer};
use crate::source::{self, Error as SourceError};
use chrono::NaiveDate;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Builds the post described by `config`, asking `prompter` whatever needs
/// asking, and returns the path of the written HTML file. `today` names the
/// output file.
pub fn build_post(config: &Config, prompter: &mut dyn Prompter, today: NaiveDate) -> Result<PathBuf> {
    let article_file = match &config.article_file {
        Some(path) => path.clone(),
        None => source::choose_article_file(&config.articles_directory, prompter)?,
    };
    let articles = source::load_articles(&article_file, &config.article_markdown_fields)?;
    let mut registry = Registry::load(&config.contributor_file)?;
    let standard = render::load_standard(&config.standard_file, &config.standard_markdown_fields)?;
    let renderer = Renderer::from_file(&config.blog_template)?;

    let reviewed = reconcile::reconcile(&articles.articles, &mut registry, prompter)?;
    let resolved = reconcile::bind_articles(articles.articles, &registry)?;
    let blog_author = reconcile::find_blog_author(&config.blog_author, &registry)?;

    let html = renderer.render(&RenderContext {
        articles: &resolved,
        blog_author: &blog_author,
        standard: &standard,
    })?;
    let html = anchors::post_process(&html)?;

    registry.save(&config.contributor_file)?;
    info!(
        path = %config.contributor_file.display(),
        added = reviewed.iter().filter(|c| c.is_new).count(),
        total = registry.contributors.len(),
        "updated contributors file"
    );

    let output = config
        .output_directory
        .join(output_file_name(&config.output_prefix, today));
    write_output(&output, &html)?;
    info!(path = %output.display(), articles = resolved.len(), "wrote post");
    Ok(output)
}

/// Names the output file after the date, e.g. `security_blog_May-01-2019.html`.
pub fn output_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.html", prefix, date.format("%B-%d-%Y"))
}

fn write_output(path: &Path, html: &str) -> Result<()> {
    let write = || -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, html)
    };
    write().map_err(|err| Error::WriteOutput {
        path: path.to_owned(),
        err,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for a run. Errors can come from loading articles,
/// the registry, reconciliation, rendering, anchor rewriting, and writing the
/// output.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading or choosing the article source.
    Source(SourceError),

    /// Returned for errors loading or saving the contributors file.
    Registry(RegistryError),

    /// Returned for matching failures and prompt failures.
    Reconcile(ReconcileError),

    /// Returned for errors loading standard content or templating.
    Render(RenderError),

    /// Returned when the rendered HTML can't be rewritten.
    Anchors(AnchorsError),

    /// Returned for I/O problems writing the output file.
    WriteOutput { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Source(err) => err.fmt(f),
            Error::Registry(err) => err.fmt(f),
            Error::Reconcile(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
            Error::Anchors(err) => err.fmt(f),
            Error::WriteOutput { path, err } => {
                write!(f, "Writing output file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Source(err) => Some(err),
            Error::Registry(err) => Some(err),
            Error::Reconcile(err) => Some(err),
            Error::Render(err) => Some(err),
            Error::Anchors(err) => Some(err),
            Error::WriteOutput { path: _, err } => Some(err),
        }
    }
}

impl From<SourceError> for Error {
    fn from(err: SourceError) -> Error {
        Error::Source(err)
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Error {
        Error::Registry(err)
    }
}

impl From<ReconcileError> for Error {
    fn from(err: ReconcileError) -> Error {
        Error::Reconcile(err)
    }
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}

impl From<AnchorsError> for Error {
    fn from(err: AnchorsError) -> Error {
        Error::Anchors(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_output_file_name() {
        let date = NaiveDate::from_ymd_opt(2019, 5, 1).unwrap();
        assert_eq!(
            "security_blog_May-01-2019.html",
            output_file_name("security_blog", date)
        );
    }
}
