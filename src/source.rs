//! Loads the article collection from a YAML or CSV source file. Both formats
//! are first assembled into the same generic tree (`{articles: [...]}`), run
//! through [`markdown::mark_down_fields`], and only then converted into typed
//! [`Article`]s, so the Markdown handling is identical for both.

use crate::article::{split_authors, ArticleSet};
use crate::markdown;
use crate::prompt::{self, Prompter};
use crate::util::{self, FileKind, MissingFileError};
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// The columns a CSV article source is expected to have.
pub const EXPECTED_COLUMNS: [&str; 5] = ["title", "authors", "summary", "contributor", "url"];

/// The supported article source formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Yaml,
    Csv,
}

impl SourceFormat {
    /// `.yml` and `.yaml` files are YAML; everything else is read as CSV.
    pub fn from_path(path: &Path) -> SourceFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                SourceFormat::Yaml
            }
            _ => SourceFormat::Csv,
        }
    }
}

/// Loads the articles at `path`, converting `markdown_fields` to HTML.
pub fn load_articles<S: AsRef<str>>(path: &Path, markdown_fields: &[S]) -> Result<ArticleSet> {
    let format = SourceFormat::from_path(path);
    info!(path = %path.display(), ?format, "loading articles");
    let tree = match format {
        SourceFormat::Yaml => {
            let contents = util::read_to_string(path, FileKind::Articles)?;
            serde_yaml::from_str(&contents).map_err(|err| Error::Yaml {
                path: path.to_owned(),
                err,
            })?
        }
        SourceFormat::Csv => {
            let bytes = util::read_bytes(path, FileKind::Articles)?;
            csv_tree(&bytes).map_err(|err| err.annotate(path))?
        }
    };
    articles_from_tree(tree, markdown_fields).map_err(|err| err.annotate(path))
}

/// Converts a source tree into typed articles. The tree must be a mapping
/// with a non-empty `articles` sequence, and every article must name a
/// contributor.
pub fn articles_from_tree<S: AsRef<str>>(tree: Value, markdown_fields: &[S]) -> Result<ArticleSet> {
    let articles_key = Value::String("articles".to_owned());
    let has_articles = match &tree {
        Value::Mapping(m) => match m.get(&articles_key) {
            Some(Value::Sequence(items)) => !items.is_empty(),
            _ => false,
        },
        _ => false,
    };
    if !has_articles {
        return Err(Error::MalformedSource(
            "expected a top-level `articles` list with at least one article".to_owned(),
        ));
    }

    let tree = markdown::mark_down_fields(tree, markdown_fields);
    let set: ArticleSet = serde_yaml::from_value(tree).map_err(Error::Shape)?;
    if let Some((i, article)) = set
        .articles
        .iter()
        .enumerate()
        .find(|(_, article)| article.contributor.trim().is_empty())
    {
        return Err(Error::MalformedSource(format!(
            "article {} ('{}') names no contributor",
            i + 1,
            article.title
        )));
    }
    debug!(articles = set.articles.len(), "parsed article source");
    Ok(set)
}

/// Folds non-ASCII text to its closest ASCII spelling (`Zoë Ångström`
/// becomes `Zoe Angstrom`). CSV exports from spreadsheets are the usual
/// source of stray typographic characters.
pub fn fold_to_ascii(text: &str) -> String {
    deunicode::deunicode(text)
}

// Builds `{articles: [...]}` from CSV bytes. Every header and cell is decoded
// and folded to ASCII after parsing; rows missing an expected column get an
// empty string for it.
fn csv_tree(bytes: &[u8]) -> Result<Value> {
    const BOM: &[u8] = b"\xEF\xBB\xBF";
    let bytes = bytes.strip_prefix(BOM).unwrap_or(bytes);
    let text = String::from_utf8_lossy(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(fold_to_ascii).collect();
    if !EXPECTED_COLUMNS
        .iter()
        .any(|column| headers.iter().any(|h| h == column))
    {
        return Err(Error::MalformedSource(format!(
            "none of the expected columns ({}) were found in the header",
            EXPECTED_COLUMNS.join(", ")
        )));
    }

    let mut articles = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Mapping::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            let cell = fold_to_ascii(cell);
            let value = match header.as_str() {
                "authors" => authors_value(&cell),
                _ => Value::String(cell),
            };
            row.insert(Value::String(header.clone()), value);
        }
        for column in EXPECTED_COLUMNS.iter() {
            let key = Value::String((*column).to_owned());
            if !row.contains_key(&key) {
                let default = match *column {
                    "authors" => Value::Sequence(Vec::new()),
                    _ => Value::String(String::new()),
                };
                row.insert(key, default);
            }
        }
        articles.push(Value::Mapping(row));
    }

    let mut tree = Mapping::new();
    tree.insert(Value::String("articles".to_owned()), Value::Sequence(articles));
    Ok(Value::Mapping(tree))
}

fn authors_value(cell: &str) -> Value {
    Value::Sequence(split_authors(cell).into_iter().map(Value::String).collect())
}

/// How many recently modified article files the picker offers.
const RECENT_FILES: usize = 5;

const NONE_OF_THE_ABOVE: &str = "none of the above";

/// Lists the names of the most recently modified files in `dir`, newest
/// first.
pub fn recent_article_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut files: Vec<(SystemTime, String)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_file() {
            files.push((
                metadata.modified()?,
                entry.file_name().to_string_lossy().into_owned(),
            ));
        }
    }
    files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(files
        .into_iter()
        .take(RECENT_FILES)
        .map(|(_, name)| name)
        .collect())
}

/// Asks the operator which article file in `dir` to use. Recent files are
/// offered first; otherwise the operator may type a name, retrying while the
/// named file doesn't exist.
pub fn choose_article_file(dir: &Path, prompter: &mut dyn Prompter) -> Result<PathBuf> {
    let recent = recent_article_files(dir).map_err(|err| Error::ListArticles {
        path: dir.to_owned(),
        err,
    })?;

    if !recent.is_empty() {
        let mut items = recent.clone();
        items.push(NONE_OF_THE_ABOVE.to_owned());
        let picked = prompter.select("which article file should we use?", &items)?;
        if let Some(name) = recent.get(picked) {
            return Ok(dir.join(name));
        }
        if !prompter.confirm("is there an article file already created but not listed?")? {
            return Err(Error::NoArticleFile);
        }
    }

    loop {
        let name = prompter.input(&format!(
            "what is the name of the file (it must be in {})?",
            dir.display()
        ))?;
        let path = dir.join(name.trim());
        if !name.trim().is_empty() && path.is_file() {
            return Ok(path);
        }
        let again = prompter.confirm(&format!(
            "hey... {} doesn't exist. you wanna try that again?",
            path.display()
        ))?;
        if !again {
            return Err(Error::NoArticleFile);
        }
    }
}

/// The result of loading articles.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the article source.
#[derive(Debug)]
pub enum Error {
    /// Returned when the source file is absent or unreadable.
    MissingFile(MissingFileError),

    /// Returned when the source lacks the expected structure.
    MalformedSource(String),

    /// Returned when a YAML source isn't valid YAML.
    Yaml { path: PathBuf, err: serde_yaml::Error },

    /// Returned when a CSV source can't be parsed.
    Csv(csv::Error),

    /// Returned when the article entries have the wrong types.
    Shape(serde_yaml::Error),

    /// Returned when the articles directory can't be listed.
    ListArticles { path: PathBuf, err: std::io::Error },

    /// Returned when the operator has no article file to offer.
    NoArticleFile,

    /// Returned when the operator couldn't be asked.
    Prompt(prompt::Error),

    /// An error with the path of the file being loaded.
    Annotated(PathBuf, Box<Error>),
}

impl Error {
    fn annotate(self, path: &Path) -> Error {
        match self {
            Error::MissingFile(_) | Error::Yaml { .. } | Error::Annotated(..) => self,
            _ => Error::Annotated(path.to_owned(), Box::new(self)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingFile(err) => err.fmt(f),
            Error::MalformedSource(why) => {
                write!(f, "Article file isn't formatted correctly: {}", why)
            }
            Error::Yaml { path, err } => {
                write!(f, "Parsing article file `{}`: {}", path.display(), err)
            }
            Error::Csv(err) => write!(f, "Parsing CSV: {}", err),
            Error::Shape(err) => write!(f, "Reading articles: {}", err),
            Error::ListArticles { path, err } => {
                write!(f, "Listing article files in `{}`: {}", path.display(), err)
            }
            Error::NoArticleFile => write!(f, "No article file to work with"),
            Error::Prompt(err) => err.fmt(f),
            Error::Annotated(path, err) => write!(f, "{}: {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingFile(err) => Some(err),
            Error::MalformedSource(_) => None,
            Error::Yaml { path: _, err } => Some(err),
            Error::Csv(err) => Some(err),
            Error::Shape(err) => Some(err),
            Error::ListArticles { path: _, err } => Some(err),
            Error::NoArticleFile => None,
            Error::Prompt(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<MissingFileError> for Error {
    fn from(err: MissingFileError) -> Error {
        Error::MissingFile(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Error {
        Error::Csv(err)
    }
}

impl From<prompt::Error> for Error {
    fn from(err: prompt::Error) -> Error {
        Error::Prompt(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::prompt::{Answer, ScriptedPrompter};
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SourceFormat::Yaml, SourceFormat::from_path(Path::new("a/jan.yml")));
        assert_eq!(SourceFormat::Yaml, SourceFormat::from_path(Path::new("jan.YAML")));
        assert_eq!(SourceFormat::Csv, SourceFormat::from_path(Path::new("jan.csv")));
        assert_eq!(SourceFormat::Csv, SourceFormat::from_path(Path::new("jan")));
    }

    #[test]
    fn test_load_yaml_converts_summary_only() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "jan.yml",
            "articles:\n\
             - title: '*Big* news'\n  authors: [Alice, Bob]\n  summary: 'Read *this*'\n  contributor: Jane Doe\n  url: https://example.org/a\n",
        );
        let set = load_articles(&path, &["summary"])?;
        let article = &set.articles[0];
        assert_eq!("*Big* news", article.title);
        assert_eq!("Read <em>this</em>", article.summary);
        assert_eq!(vec!["Alice", "Bob"], article.authors);
        Ok(())
    }

    #[test]
    fn test_load_yaml_without_articles_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "jan.yml", "posts: []\n");
        match load_articles(&path, &["summary"]) {
            Err(Error::Annotated(_, err)) => assert!(matches!(*err, Error::MalformedSource(_))),
            other => panic!("expected malformed source, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.csv");
        assert!(matches!(
            load_articles(&path, &["summary"]),
            Err(Error::MissingFile(_))
        ));
    }

    #[test]
    fn test_load_csv_defaults_missing_columns() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "jan.csv",
            "title,authors,summary,contributor\n\
             Patch now,\"Alice, Bob,Carol\",**Urgent** fix,Jane Doe\n",
        );
        let set = load_articles(&path, &["summary"])?;
        let article = &set.articles[0];
        assert_eq!("", article.url);
        assert_eq!(vec!["Alice", "Bob", "Carol"], article.authors);
        assert_eq!("<strong>Urgent</strong> fix", article.summary);
        assert_eq!("Jane Doe", article.contributor);
        Ok(())
    }

    #[test]
    fn test_load_csv_short_row() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "jan.csv",
            "contributor,title,authors,summary,url\nJane Doe,Only a title\n",
        );
        let set = load_articles(&path, &["summary"])?;
        assert_eq!("Only a title", set.articles[0].title);
        assert_eq!("", set.articles[0].url);
        assert!(set.articles[0].authors.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_csv_folds_to_ascii_and_strips_bom() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "jan.csv",
            "\u{FEFF}title,authors,summary,contributor,url\n\
             Caf\u{e9} \u{201c}crème\u{201d},Zo\u{eb} \u{c5}ngstr\u{f6}m,s,Ren\u{e9}e,https://example.org\n",
        );
        let set = load_articles(&path, &[] as &[&str])?;
        let article = &set.articles[0];
        assert_eq!("Cafe \"creme\"", article.title);
        assert_eq!(vec!["Zoe Angstrom"], article.authors);
        assert_eq!("Renee", article.contributor);
        Ok(())
    }

    #[test]
    fn test_load_csv_without_known_columns_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "jan.csv", "a;b;c\n1;2;3\n");
        match load_articles(&path, &["summary"]) {
            Err(Error::Annotated(_, err)) => assert!(matches!(*err, Error::MalformedSource(_))),
            other => panic!("expected malformed source, got {:?}", other),
        }
    }

    #[test]
    fn test_load_csv_without_contributor_column_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "jan.csv", "title,authors,summary,url\nT,A,s,https://x\n");
        match load_articles(&path, &["summary"]) {
            Err(Error::Annotated(_, err)) => assert!(matches!(*err, Error::MalformedSource(_))),
            other => panic!("expected malformed source, got {:?}", other),
        }
    }

    #[test]
    fn test_load_yaml_blank_contributor_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "jan.yml",
            "articles:\n\
             - title: One\n  contributor: Jane Doe\n\
             - title: Two\n  contributor: '   '\n",
        );
        match load_articles(&path, &["summary"]) {
            Err(Error::Annotated(_, err)) => match *err {
                Error::MalformedSource(msg) => assert!(msg.contains("Two"), "{}", msg),
                other => panic!("expected malformed source, got {:?}", other),
            },
            other => panic!("expected malformed source, got {:?}", other),
        }
    }

    #[test]
    fn test_choose_article_file_from_recent() -> Result<()> {
        let dir = TempDir::new().unwrap();
        write(&dir, "jan.yml", "articles: []\n");
        let mut prompter = ScriptedPrompter::new(vec![Answer::Select(0)]);
        let path = choose_article_file(dir.path(), &mut prompter)?;
        assert_eq!(dir.path().join("jan.yml"), path);
        Ok(())
    }

    #[test]
    fn test_choose_article_file_retries_then_gives_up() {
        let dir = TempDir::new().unwrap();
        write(&dir, "jan.yml", "articles: []\n");
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Select(1),
            Answer::Confirm(true),
            Answer::text("feb.yml"),
            Answer::Confirm(true),
            Answer::text("mar.yml"),
            Answer::Confirm(false),
        ]);
        assert!(matches!(
            choose_article_file(dir.path(), &mut prompter),
            Err(Error::NoArticleFile)
        ));
        assert_eq!(0, prompter.remaining());
    }

    #[test]
    fn test_choose_article_file_empty_directory_asks_for_name() {
        let dir = TempDir::new().unwrap();
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::text("feb.csv"),
            Answer::Confirm(false),
        ]);
        assert!(matches!(
            choose_article_file(dir.path(), &mut prompter),
            Err(Error::NoArticleFile)
        ));
        assert_eq!(2, prompter.transcript.len());
    }
}
