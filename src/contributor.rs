//! Defines the [`Contributor`] profile and the [`Registry`] that persists
//! them between runs.

use crate::util::{self, FileKind, MissingFileError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Keys older versions of the tool left behind in the registry file, plus a
/// literal `is_new` written by hand. They are dropped whenever the registry is
/// written.
const LEGACY_MARKERS: &[&str] = &["new", "added", "is_new"];

/// A named profile attributed to one or more articles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    /// Unique within the registry under [`same_name`] comparison.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wittycism: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Path or URL of a picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headshot: Option<String>,

    /// Handle without the leading `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,

    /// Any other keys found in the registry, carried through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,

    /// Set while reconciling a contributor that isn't in the registry yet.
    #[serde(skip)]
    pub is_new: bool,
}

impl Contributor {
    /// A stub for a name that matched nothing in the registry.
    pub fn new_stub(name: &str) -> Contributor {
        Contributor {
            name: name.trim().to_owned(),
            is_new: true,
            ..Contributor::default()
        }
    }

    /// Returns the value of one of the editable fields.
    pub fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Wittycism => self.wittycism.as_deref(),
            Field::Url => self.url.as_deref(),
            Field::Headshot => self.headshot.as_deref(),
            Field::Twitter => self.twitter.as_deref(),
        }
    }

    /// Stores an operator answer. Empty answers keep the current value, and
    /// twitter handles lose their leading `@`.
    pub fn set_field(&mut self, field: Field, answer: &str) {
        let answer = answer.trim();
        if answer.is_empty() {
            return;
        }
        let value = match field {
            Field::Twitter => answer.trim_start_matches('@').to_owned(),
            _ => answer.to_owned(),
        };
        let slot = match field {
            Field::Wittycism => &mut self.wittycism,
            Field::Url => &mut self.url,
            Field::Headshot => &mut self.headshot,
            Field::Twitter => &mut self.twitter,
        };
        *slot = Some(value);
    }

    /// A multi-line rendering of the current values, shown to the operator.
    pub fn summary(&self) -> String {
        let mut out = format!("     name: {}\n", self.name);
        for field in Field::ALL.iter() {
            out.push_str(&format!(
                "     {}: {}\n",
                field,
                self.field(*field).unwrap_or("")
            ));
        }
        out
    }

    fn strip_markers(&mut self) {
        self.is_new = false;
        for marker in LEGACY_MARKERS {
            self.extra.remove(*marker);
        }
    }
}

/// The fields of a [`Contributor`] the operator may edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Wittycism,
    Url,
    Headshot,
    Twitter,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Wittycism, Field::Url, Field::Headshot, Field::Twitter];

    pub fn name(self) -> &'static str {
        match self {
            Field::Wittycism => "wittycism",
            Field::Url => "url",
            Field::Headshot => "headshot",
            Field::Twitter => "twitter",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compares contributor names ignoring case and surrounding whitespace.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// The persisted collection of all known contributors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    pub contributors: Vec<Contributor>,

    /// Other top-level keys of the registry file.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Registry {
    /// Loads the registry from `path`. The file must exist before
    /// reconciliation starts.
    pub fn load(path: &Path) -> Result<Registry> {
        let contents = util::read_to_string(path, FileKind::Contributors)?;
        Registry::from_str(&contents).map_err(|err| Error::Yaml {
            path: path.to_owned(),
            err,
        })
    }

    pub fn from_str(contents: &str) -> std::result::Result<Registry, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Indices of every entry whose name matches `name` under [`same_name`].
    pub fn find(&self, name: &str) -> Vec<usize> {
        self.contributors
            .iter()
            .enumerate()
            .filter(|(_, c)| same_name(&c.name, name))
            .map(|(i, _)| i)
            .collect()
    }

    /// Folds reconciled contributors back in: entries already in the
    /// registry are replaced by their edited version, new ones are appended,
    /// and transient markers are stripped from every entry.
    pub fn merge(&mut self, reconciled: &[Contributor]) {
        for contributor in reconciled {
            match self.find(&contributor.name).first() {
                Some(&i) if !contributor.is_new => {
                    self.contributors[i] = contributor.clone();
                }
                Some(_) => {}
                None => self.contributors.push(contributor.clone()),
            }
        }
        for contributor in self.contributors.iter_mut() {
            contributor.strip_markers();
        }
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Overwrites `path` with the full registry.
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = self.to_yaml().map_err(|err| Error::Yaml {
            path: path.to_owned(),
            err,
        })?;
        std::fs::write(path, yaml).map_err(|err| Error::Write {
            path: path.to_owned(),
            err,
        })
    }
}

/// The result of a fallible registry operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or saving the [`Registry`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the registry file is absent or unreadable.
    MissingFile(MissingFileError),

    /// Returned when the registry file isn't valid YAML of the expected shape.
    Yaml { path: PathBuf, err: serde_yaml::Error },

    /// Returned when the registry can't be written back.
    Write { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingFile(err) => write!(
                f,
                "{} (create it with at least one contributor and try again)",
                err
            ),
            Error::Yaml { path, err } => {
                write!(f, "Parsing contributors file `{}`: {}", path.display(), err)
            }
            Error::Write { path, err } => {
                write!(f, "Writing contributors file `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingFile(err) => Some(err),
            Error::Yaml { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
        }
    }
}

impl From<MissingFileError> for Error {
    fn from(err: MissingFileError) -> Error {
        Error::MissingFile(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const REGISTRY: &str = "\
contributors:
- name: Jane Doe
  twitter: janed
  new: false
- name: Zoë Ångström
  wittycism: Über
  added: true
  pronouns: they/them
site: example
";

    #[test]
    fn test_same_name() {
        assert!(same_name("  Jane Doe ", "Jane Doe"));
        assert!(same_name("JANE DOE", "jane doe"));
        assert!(!same_name("Jane", "Jane Doe"));
    }

    #[test]
    fn test_set_field_strips_at_and_ignores_empty() {
        let mut c = Contributor::new_stub("New Person");
        c.set_field(Field::Twitter, "@np");
        c.set_field(Field::Url, "");
        assert_eq!(Some("np"), c.twitter.as_deref());
        assert_eq!(None, c.url);
    }

    #[test]
    fn test_merge_appends_new_and_replaces_existing() -> std::result::Result<(), serde_yaml::Error> {
        let mut registry = Registry::from_str(REGISTRY)?;
        let mut jane = registry.contributors[0].clone();
        jane.wittycism = Some("hello".to_owned());
        let stub = Contributor::new_stub(" New Person ");
        registry.merge(&[jane, stub]);

        assert_eq!(3, registry.contributors.len());
        assert_eq!(Some("hello"), registry.contributors[0].wittycism.as_deref());
        assert_eq!("New Person", registry.contributors[2].name);
        assert!(registry.contributors.iter().all(|c| !c.is_new));
        Ok(())
    }

    #[test]
    fn test_merge_never_duplicates() -> std::result::Result<(), serde_yaml::Error> {
        let mut registry = Registry::from_str(REGISTRY)?;
        registry.merge(&[Contributor::new_stub("jane doe")]);
        assert_eq!(1, registry.find("Jane Doe").len());
        Ok(())
    }

    #[test]
    fn test_yaml_strips_markers_and_keeps_extras() -> std::result::Result<(), serde_yaml::Error> {
        let mut registry = Registry::from_str(REGISTRY)?;
        registry.merge(&[]);
        let yaml = registry.to_yaml()?;
        assert!(!yaml.contains("new:"));
        assert!(!yaml.contains("added:"));
        assert!(!yaml.contains("is_new"));
        assert!(yaml.contains("pronouns: they/them"));
        assert!(yaml.contains("site: example"));
        assert!(yaml.contains("Zoë Ångström"));

        let reloaded = Registry::from_str(&yaml)?;
        assert_eq!(registry, reloaded);
        Ok(())
    }

    #[test]
    fn test_literal_is_new_key_is_dropped() -> std::result::Result<(), serde_yaml::Error> {
        let mut registry =
            Registry::from_str("contributors:\n- name: Jane Doe\n  is_new: true\n")?;
        assert!(!registry.contributors[0].is_new);
        registry.merge(&[]);
        assert!(registry.contributors[0].extra.is_empty());
        assert!(!registry.to_yaml()?.contains("is_new"));
        Ok(())
    }

    #[test]
    fn test_load_missing_registry() {
        match Registry::load(Path::new("/nonexistent/contributors.yml")) {
            Err(Error::MissingFile(err)) => assert_eq!(FileKind::Contributors, err.kind),
            other => panic!("expected missing file error, got {:?}", other),
        }
    }
}
