//! Defines the [`Article`] record as read from a source file and the
//! [`ResolvedArticle`] it becomes once its contributor has been reconciled.

use crate::contributor::Contributor;
use serde::{Deserialize, Deserializer};

/// One entry of the blog post, as read from the article source. Fields that
/// are absent from the source default to empty values.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,

    /// The authors of the linked article, in source order.
    #[serde(default, deserialize_with = "deserialize_authors")]
    pub authors: Vec<String>,

    /// An HTML fragment once the source loader has converted it.
    #[serde(default)]
    pub summary: String,

    /// The raw contributor name, matched against the registry during
    /// reconciliation.
    #[serde(default)]
    pub contributor: String,

    #[serde(default)]
    pub url: String,
}

/// The canonical article collection produced by [`crate::source`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ArticleSet {
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// An [`Article`] whose contributor reference is bound to exactly one registry
/// entry.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedArticle {
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub contributor: Contributor,
    pub url: String,
}

impl Article {
    pub fn resolve(self, contributor: Contributor) -> ResolvedArticle {
        ResolvedArticle {
            title: self.title,
            authors: self.authors,
            summary: self.summary,
            contributor,
            url: self.url,
        }
    }
}

/// Splits a comma-joined author cell into trimmed names, dropping empties.
pub fn split_authors(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

// Accepts either a YAML sequence or a single comma-joined string.
fn deserialize_authors<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Authors {
        List(Vec<String>),
        Joined(String),
        Nothing(()),
    }

    Ok(match Authors::deserialize(deserializer)? {
        Authors::List(names) => names,
        Authors::Joined(cell) => split_authors(&cell),
        Authors::Nothing(()) => Vec::new(),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_authors() {
        assert_eq!(
            vec!["Alice".to_owned(), "Bob".to_owned(), "Carol".to_owned()],
            split_authors("Alice, Bob ,Carol,")
        );
        assert!(split_authors("").is_empty());
    }

    #[test]
    fn test_authors_accepts_sequence_or_string() -> Result<(), serde_yaml::Error> {
        let set: ArticleSet = serde_yaml::from_str(
            "articles:\n\
             - title: One\n  authors: [Alice, Bob]\n\
             - title: Two\n  authors: Carol, Dan\n\
             - title: Three\n  authors:\n",
        )?;
        assert_eq!(vec!["Alice", "Bob"], set.articles[0].authors);
        assert_eq!(vec!["Carol", "Dan"], set.articles[1].authors);
        assert!(set.articles[2].authors.is_empty());
        assert_eq!("", set.articles[2].url);
        Ok(())
    }
}
