//! Shared test utilities for integration tests.
//!
//! Lays out a throwaway project directory with the conventional
//! `articles/`, `content/`, `templates/` folders.

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const CONTRIBUTORS: &str = "\
contributors:
- name: Jane Doe
  wittycism: Ships on Fridays
  twitter: janed
  new: false
- name: John Roe
  url: https://roe.example
";

pub const STANDARD: &str = "\
title: Security Weekly
intro: Welcome to *this week's* roundup
";

pub const TEMPLATE: &str = r##"<html>
<body>
<h1>{{.standard.title}}</h1>
<p>{{.standard.intro}}</p>
{{range .articles}}<div class="article">
<a href="{{.url}}" title="article_title">{{.authors_joined}}</a>
<h2>{{.title}}</h2>
<p>{{.summary}}</p>
<p>via {{.contributor.name}}{{if .contributor.twitter}} (@{{.contributor.twitter}}){{end}}</p>
</div>
{{end}}<a href="#">back to top</a>
<footer>{{.blog_author.name}}: {{.blog_author.wittycism}}</footer>
</body>
</html>
"##;

/// Creates a project with the given article file plus the standard
/// contributors, standard content and template files.
pub fn create_project(article_name: &str, articles: &str) -> Result<TempDir> {
    let dir = TempDir::new()?;
    let root = dir.path();
    write(root, &format!("articles/{}", article_name), articles)?;
    write(root, "content/contributors.yml", CONTRIBUTORS)?;
    write(root, "content/standard.yml", STANDARD)?;
    write(root, "templates/blog_template.html", TEMPLATE)?;
    Ok(dir)
}

/// Writes `contents` to `root/relative`, creating parent directories.
pub fn write(root: &Path, relative: &str, contents: &str) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// The trimmed, non-empty lines of a pretty-printed document.
pub fn lines(html: &str) -> Vec<&str> {
    html.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

/// Whether `expected` appears as consecutive lines of `html`.
pub fn has_lines(html: &str, expected: &[&str]) -> bool {
    lines(html).windows(expected.len()).any(|w| w == expected)
}
