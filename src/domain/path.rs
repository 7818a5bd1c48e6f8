//! Addresses of nodes in a form property tree.
//!
//! Two spellings are read: the dotted form used in bindings
//! (`address.lines[1]`) and JSON pointers (`/address/lines/1`). The empty
//! path is the form root.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::{FormError, FormResult};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Named child of an object node
    Property(String),
    /// Element of an array node
    Index(usize),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn push_property(&self, name: &str) -> Self {
        self.with(PathSegment::Property(name.to_string()))
    }

    pub fn push_index(&self, idx: usize) -> Self {
        self.with(PathSegment::Index(idx))
    }

    fn with(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Path of the enclosing node; the root is its own parent.
    pub fn parent(&self) -> Self {
        let end = self.segments.len().saturating_sub(1);
        Self {
            segments: self.segments[..end].to_vec(),
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// `relative` resolved below this path.
    pub fn join(&self, relative: &PropertyPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(relative.segments.iter().cloned());
        Self { segments }
    }

    /// Binding expression for markup: the model object name, then the path.
    pub fn qualified(&self, model_name: &str) -> String {
        match self.segments.first() {
            None => model_name.to_string(),
            Some(PathSegment::Index(_)) => format!("{}{}", model_name, self),
            Some(PathSegment::Property(_)) => format!("{}.{}", model_name, self),
        }
    }

    /// Read a dotted path (`tags[0].label`) or a JSON pointer (`/tags/0/label`).
    ///
    /// Bracket contents must be array indexes; `tags[x]` is rejected rather
    /// than read as `tags`.
    pub fn parse(input: &str) -> FormResult<Self> {
        let input = input.trim();
        if input.starts_with('/') {
            return Ok(Self::from_pointer(input));
        }
        if input.is_empty() {
            return Ok(Self::root());
        }

        let invalid = |reason: String| FormError::InvalidPath {
            path: input.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        for part in input.split('.') {
            let (name, mut rest) = part.split_at(part.find('[').unwrap_or(part.len()));
            if name.is_empty() && rest.is_empty() {
                return Err(invalid("empty segment".to_string()));
            }
            if !name.is_empty() {
                segments.push(PathSegment::Property(name.to_string()));
            }
            while let Some(body) = rest.strip_prefix('[') {
                let (index, tail) = body
                    .split_once(']')
                    .ok_or_else(|| invalid("unclosed '['".to_string()))?;
                let index = index
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| invalid(format!("'{}' is not an array index", index)))?;
                segments.push(PathSegment::Index(index));
                rest = tail;
            }
            if !rest.is_empty() {
                return Err(invalid(format!("unexpected '{}' after index", rest)));
            }
        }
        Ok(Self { segments })
    }

    /// Path named by a JSON pointer. All-digit tokens address array elements.
    pub fn from_pointer(pointer: &str) -> Self {
        let segments = pointer
            .split('/')
            .skip(1)
            .filter(|token| !token.is_empty())
            .map(|token| match token.parse::<usize>() {
                Ok(idx) if token.bytes().all(|b| b.is_ascii_digit()) => PathSegment::Index(idx),
                _ => PathSegment::Property(token.replace("~1", "/").replace("~0", "~")),
            })
            .collect();
        Self { segments }
    }
}

impl FromStr for PropertyPath {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Property(name) if i == 0 => f.write_str(name)?,
                PathSegment::Property(name) => write!(f, ".{}", name)?,
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

impl Serialize for PropertyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
