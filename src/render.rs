//! The template step: loads the standard content, parses the post template,
//! and substitutes a [`RenderContext`] into it. Templates use Go template
//! syntax (see [`gtmpl`]) and see three top-level names: `.articles`,
//! `.blog_author` and `.standard`.

use crate::article::ResolvedArticle;
use crate::contributor::Contributor;
use crate::markdown;
use crate::util::{self, FileKind, MissingFileError};
use crate::value::from_yaml;
use gtmpl::{Context, Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Everything a template can reference.
pub struct RenderContext<'a> {
    /// The reconciled articles, in source order.
    pub articles: &'a [ResolvedArticle],

    /// The author of record for the post.
    pub blog_author: &'a Contributor,

    /// The standard content tree, already Markdown-converted.
    pub standard: &'a serde_yaml::Value,
}

impl RenderContext<'_> {
    /// Converts the context into a [`Value::Object`] with fields `articles`,
    /// `blog_author` and `standard`.
    fn to_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "articles".to_owned(),
            Value::Array(self.articles.iter().map(Value::from).collect()),
        );
        m.insert("blog_author".to_owned(), self.blog_author.into());
        m.insert("standard".to_owned(), from_yaml(self.standard));
        Value::Object(m)
    }
}

/// A parsed post template.
pub struct Renderer {
    template: Template,
}

impl Renderer {
    /// Reads and parses the template at `path`.
    pub fn from_file(path: &Path) -> Result<Renderer> {
        let contents = util::read_to_string(path, FileKind::Template)?;
        Renderer::parse(&contents).map_err(|err| match err {
            Error::ParseTemplate(msg) => Error::ParseTemplateFile {
                path: path.to_owned(),
                msg,
            },
            err => err,
        })
    }

    pub fn parse(contents: &str) -> Result<Renderer> {
        let mut template = Template::default();
        template.parse(contents).map_err(Error::ParseTemplate)?;
        Ok(Renderer { template })
    }

    /// Substitutes `context` into the template.
    pub fn render(&self, context: &RenderContext) -> Result<String> {
        let context = Context::from(context.to_value()).map_err(Error::Template)?;
        self.template.render(&context).map_err(Error::Template)
    }
}

/// Loads the standard content file and converts `markdown_fields` at any
/// depth.
pub fn load_standard<S: AsRef<str>>(path: &Path, markdown_fields: &[S]) -> Result<serde_yaml::Value> {
    let contents = util::read_to_string(path, FileKind::Standard)?;
    let tree: serde_yaml::Value = serde_yaml::from_str(&contents).map_err(|err| Error::Yaml {
        path: path.to_owned(),
        err,
    })?;
    Ok(markdown::mark_down_fields(tree, markdown_fields))
}

/// The result of a rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading inputs for, or executing, the template.
#[derive(Debug)]
pub enum Error {
    /// Returned when the template or standard content file is missing.
    MissingFile(MissingFileError),

    /// Returned when the standard content isn't valid YAML.
    Yaml { path: PathBuf, err: serde_yaml::Error },

    /// Returned for errors parsing template text.
    ParseTemplate(String),

    /// Returned for errors parsing a template file.
    ParseTemplateFile { path: PathBuf, msg: String },

    /// Returned for errors while executing the template.
    Template(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingFile(err) => err.fmt(f),
            Error::Yaml { path, err } => {
                write!(f, "Parsing standard content file `{}`: {}", path.display(), err)
            }
            Error::ParseTemplate(msg) => write!(f, "Parsing template: {}", msg),
            Error::ParseTemplateFile { path, msg } => {
                write!(f, "Parsing template file `{}`: {}", path.display(), msg)
            }
            Error::Template(msg) => write!(f, "Rendering template: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingFile(err) => Some(err),
            Error::Yaml { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::ParseTemplateFile { .. } => None,
            Error::Template(_) => None,
        }
    }
}

impl From<MissingFileError> for Error {
    fn from(err: MissingFileError) -> Error {
        Error::MissingFile(err)
    }
}
