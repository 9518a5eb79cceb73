//! Resolves every path and setting a run needs. Defaults follow the
//! conventional layout (`articles/`, `content/`, `templates/`, `output/`
//! under the project root); an optional `blogomatic.yaml` in the project root
//! or any parent directory overrides them.

use crate::util::{self, FileKind};
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The name of the optional project file.
pub const PROJECT_FILE: &str = "blogomatic.yaml";

#[derive(Deserialize)]
#[serde(default)]
struct Project {
    articles_directory: PathBuf,
    content_directory: PathBuf,
    templates_directory: PathBuf,
    output_directory: PathBuf,
    contributor_file: String,
    standard_file: String,
    blog_template: String,
    article_markdown_fields: Vec<String>,
    standard_markdown_fields: Vec<String>,
    output_prefix: String,
    blog_author: Option<String>,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            articles_directory: PathBuf::from("articles"),
            content_directory: PathBuf::from("content"),
            templates_directory: PathBuf::from("templates"),
            output_directory: PathBuf::from("output"),
            contributor_file: String::from("contributors.yml"),
            standard_file: String::from("standard.yml"),
            blog_template: String::from("blog_template.html"),
            article_markdown_fields: vec![String::from("summary")],
            standard_markdown_fields: vec![String::from("intro")],
            output_prefix: String::from("security_blog"),
            blog_author: None,
        }
    }
}

/// Command-line choices. Every field left `None` falls back to the project
/// file or the built-in default.
#[derive(Debug, Default)]
pub struct Overrides {
    pub blog_author: Option<String>,
    pub article_file: Option<String>,
    pub contributor_file: Option<String>,
    pub standard_file: Option<String>,
    pub blog_template: Option<String>,
}

/// The fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The name of the contributor who authors the post.
    pub blog_author: String,

    pub articles_directory: PathBuf,

    /// The article source. `None` means the operator picks one from
    /// [`Config::articles_directory`].
    pub article_file: Option<PathBuf>,

    pub contributor_file: PathBuf,
    pub standard_file: PathBuf,
    pub blog_template: PathBuf,

    /// Article keys whose values are Markdown.
    pub article_markdown_fields: Vec<String>,

    /// Standard content keys whose values are Markdown.
    pub standard_markdown_fields: Vec<String>,

    pub output_directory: PathBuf,

    /// Output files are named `{output_prefix}_{Month-DD-YYYY}.html`.
    pub output_prefix: String,
}

impl Config {
    /// Looks for [`PROJECT_FILE`] in `dir` and its parents. The directory
    /// holding it becomes the project root; without one, `dir` is the root
    /// and defaults apply.
    pub fn from_directory(dir: &Path, overrides: Overrides) -> Result<Config> {
        let mut candidate = Some(dir);
        while let Some(current) = candidate {
            let path = current.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path, overrides)
                    .map_err(|e| anyhow!("Loading configuration: {:?}", e));
            }
            candidate = current.parent();
        }
        Config::resolve(dir, Project::default(), overrides)
    }

    /// Loads settings from a project file; its directory is the project root.
    pub fn from_project_file(path: &Path, overrides: Overrides) -> Result<Config> {
        let contents = util::read_to_string(path, FileKind::Project)?;
        let project: Project = serde_yaml::from_str(&contents)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(root) => Config::resolve(root, project, overrides),
        }
    }

    fn resolve(root: &Path, project: Project, overrides: Overrides) -> Result<Config> {
        let blog_author = overrides
            .blog_author
            .or(project.blog_author)
            .map(|a| a.trim().to_owned())
            .filter(|a| !a.is_empty())
            .ok_or_else(|| {
                anyhow!("You need to specify a blog author with the command line parameter `--blog_author`")
            })?;

        let articles_directory = root.join(&project.articles_directory);
        let content_directory = root.join(&project.content_directory);
        let templates_directory = root.join(&project.templates_directory);
        Ok(Config {
            blog_author,
            article_file: overrides.article_file.map(|f| articles_directory.join(f)),
            articles_directory,
            contributor_file: content_directory.join(
                overrides
                    .contributor_file
                    .unwrap_or(project.contributor_file),
            ),
            standard_file: content_directory
                .join(overrides.standard_file.unwrap_or(project.standard_file)),
            blog_template: templates_directory
                .join(overrides.blog_template.unwrap_or(project.blog_template)),
            article_markdown_fields: project.article_markdown_fields,
            standard_markdown_fields: project.standard_markdown_fields,
            output_directory: root.join(&project.output_directory),
            output_prefix: project.output_prefix,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    fn author(name: &str) -> Overrides {
        Overrides {
            blog_author: Some(name.to_owned()),
            ..Overrides::default()
        }
    }

    #[test]
    fn test_defaults_without_project_file() -> Result<()> {
        let dir = TempDir::new()?;
        let config = Config::from_directory(dir.path(), author("Jane Doe"))?;
        assert_eq!("Jane Doe", config.blog_author);
        assert_eq!(dir.path().join("content/contributors.yml"), config.contributor_file);
        assert_eq!(dir.path().join("content/standard.yml"), config.standard_file);
        assert_eq!(dir.path().join("templates/blog_template.html"), config.blog_template);
        assert_eq!(None, config.article_file);
        assert_eq!(vec!["summary"], config.article_markdown_fields);
        assert_eq!(vec!["intro"], config.standard_markdown_fields);
        Ok(())
    }

    #[test]
    fn test_project_file_in_parent() -> Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "blog_author: Jane Doe\ncontent_directory: data\noutput_prefix: weekly\n",
        )?;
        let nested = dir.path().join("articles");
        std::fs::create_dir(&nested)?;

        let config = Config::from_directory(
            &nested,
            Overrides {
                article_file: Some("jan.csv".to_owned()),
                ..Overrides::default()
            },
        )?;
        assert_eq!("Jane Doe", config.blog_author);
        assert_eq!(dir.path().join("data/contributors.yml"), config.contributor_file);
        assert_eq!(Some(dir.path().join("articles/jan.csv")), config.article_file);
        assert_eq!("weekly", config.output_prefix);
        Ok(())
    }

    #[test]
    fn test_blog_author_required() -> Result<()> {
        let dir = TempDir::new()?;
        assert!(Config::from_directory(dir.path(), Overrides::default()).is_err());
        assert!(Config::from_directory(dir.path(), author("  ")).is_err());
        Ok(())
    }
}
