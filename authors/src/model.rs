// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! High-level data types.

use authors_core::model::{ModelError, ModelResult};
use derive_getters::Getters;
use derive_more::{AsRef, Constructor};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Maximum length of an author name, in characters, as specified in the schema.
pub(crate) const AUTHORS_MAX_NAME_LENGTH: usize = 32;

/// Identifier of an author, as assigned by the database on creation.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub(crate) struct AuthorId(i64);

impl AuthorId {
    /// Creates a new identifier from an untrusted integer `id`, making sure it is valid.
    ///
    /// Zero is never assigned by the database and is rejected.  Negative values are accepted so
    /// that lookups on them report a missing author like any other unknown identifier.
    pub(crate) fn new(id: i64) -> ModelResult<Self> {
        if id == 0 {
            return Err(ModelError("Author id cannot be zero".to_owned()));
        }
        Ok(Self(id))
    }

    /// Returns the identifier as an `i64` for storage purposes.
    pub(crate) fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for AuthorId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = i64::deserialize(deserializer)?;
        AuthorId::new(id).map_err(|e| de::Error::custom(e.to_string()))
    }
}

/// The display name of an author.
#[derive(AsRef, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct AuthorName(String);

impl AuthorName {
    /// Creates a new name from an untrusted string `s`, making sure it is valid.
    pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.is_empty() {
            return Err(ModelError("Author name cannot be empty".to_owned()));
        }
        if s.chars().count() > AUTHORS_MAX_NAME_LENGTH {
            return Err(ModelError(format!(
                "Author name cannot be longer than {} characters",
                AUTHORS_MAX_NAME_LENGTH
            )));
        }

        Ok(Self(s))
    }
}

/// A deserialization visitor for an `AuthorName`.
struct AuthorNameVisitor;

impl Visitor<'_> for AuthorNameVisitor {
    type Value = AuthorName;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        AuthorName::new(v).map_err(|e| E::custom(e.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        AuthorName::new(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for AuthorName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_string(AuthorNameVisitor)
    }
}

/// The free-form biography of an author.
#[derive(AsRef, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct AuthorBio(String);

impl AuthorBio {
    /// Creates a new biography from an untrusted string `s`, making sure it is valid.
    pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        if s.is_empty() {
            return Err(ModelError("Author bio cannot be empty".to_owned()));
        }
        Ok(Self(s))
    }
}

impl<'de> Deserialize<'de> for AuthorBio {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AuthorBio::new(s).map_err(|e| de::Error::custom(e.to_string()))
    }
}

/// The user-supplied fields of an author, as given to create or replace one.
#[derive(Constructor, Deserialize, Getters)]
#[cfg_attr(test, derive(Clone, Debug, PartialEq, Serialize))]
pub(crate) struct AuthorFields {
    /// The author's name.
    name: AuthorName,

    /// The author's biography.
    bio: AuthorBio,
}

/// A partial modification of an author.
///
/// Fields that are `None` were not supplied by the caller and must be left untouched.  JSON
/// `null`s are treated as if the field had been omitted.
#[derive(Constructor, Default, Deserialize, Getters)]
#[cfg_attr(test, derive(Clone, Debug, PartialEq, Serialize))]
pub(crate) struct AuthorPatch {
    /// New name for the author, if it has to change.
    #[cfg_attr(test, serde(skip_serializing_if = "Option::is_none"))]
    name: Option<AuthorName>,

    /// New biography for the author, if it has to change.
    #[cfg_attr(test, serde(skip_serializing_if = "Option::is_none"))]
    bio: Option<AuthorBio>,
}

/// An author as persisted in the database.
#[derive(Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub(crate) struct Author {
    /// Identifier assigned by the database.
    id: AuthorId,

    /// The author's name.
    name: AuthorName,

    /// The author's biography.
    bio: AuthorBio,
}

impl Author {
    /// Creates an author from the raw values of a database row, revalidating all of them.
    pub(crate) fn from_raw(id: i64, name: String, bio: String) -> ModelResult<Self> {
        Ok(Self { id: AuthorId::new(id)?, name: AuthorName::new(name)?, bio: AuthorBio::new(bio)? })
    }

    /// Returns the user-supplied fields of this author.
    #[cfg(test)]
    pub(crate) fn fields(&self) -> AuthorFields {
        AuthorFields::new(self.name.clone(), self.bio.clone())
    }
}
