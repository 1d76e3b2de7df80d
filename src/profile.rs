//! Profile record and the form state holder that publishes it
//!
//! [`ProfileForm`] owns the single mutable [`ProfileRecord`]. Every call to
//! [`ProfileForm::update_field`] replaces one attribute and notifies all
//! subscribers through a `tokio::sync::watch` channel, so the pipeline always
//! sees the latest record without polling.

use crate::error::{Error, Result};
use crate::labels::{Labels, Locale};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::watch;

/// Separator between a label and its value in the encoded text
pub const KEY_SEPARATOR: &str = ": ";

/// The four profile attributes, all free text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileRecord {
    /// Full name
    pub full_name: String,
    /// Email address (not validated)
    pub email: String,
    /// Phone number (not validated)
    pub phone: String,
    /// Short bio, may span several lines
    pub bio: String,
}

/// Identifier of one [`ProfileRecord`] attribute as emitted by form widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    /// `fullName`
    FullName,
    /// `email`
    Email,
    /// `phone`
    Phone,
    /// `bio`
    Bio,
}

impl ProfileField {
    /// Fields in encoded-text order
    pub const ALL: [ProfileField; 4] = [
        ProfileField::FullName,
        ProfileField::Email,
        ProfileField::Phone,
        ProfileField::Bio,
    ];

    /// Widget identifier
    pub fn id(self) -> &'static str {
        match self {
            ProfileField::FullName => "fullName",
            ProfileField::Email => "email",
            ProfileField::Phone => "phone",
            ProfileField::Bio => "bio",
        }
    }

    /// Form label for this field
    pub fn form_label(self, labels: &Labels) -> &str {
        match self {
            ProfileField::FullName => &labels.name_field,
            ProfileField::Email => &labels.email_field,
            ProfileField::Phone => &labels.phone_field,
            ProfileField::Bio => &labels.bio_field,
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProfileField {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "fullName" | "name" | "full_name" => Ok(ProfileField::FullName),
            "email" => Ok(ProfileField::Email),
            "phone" => Ok(ProfileField::Phone),
            "bio" => Ok(ProfileField::Bio),
            other => Err(Error::UnknownField(other.to_string())),
        }
    }
}

impl ProfileRecord {
    /// Value of one attribute
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::FullName => &self.full_name,
            ProfileField::Email => &self.email,
            ProfileField::Phone => &self.phone,
            ProfileField::Bio => &self.bio,
        }
    }

    /// Replace exactly one attribute
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let slot = match field {
            ProfileField::FullName => &mut self.full_name,
            ProfileField::Email => &mut self.email,
            ProfileField::Phone => &mut self.phone,
            ProfileField::Bio => &mut self.bio,
        };
        *slot = value.into();
    }

    /// True iff any attribute is a non-empty string. Whitespace counts.
    pub fn has_data(&self) -> bool {
        ProfileField::ALL
            .iter()
            .any(|field| !self.get(*field).is_empty())
    }

    /// Labelled multi-line text submitted to the QR encoder.
    ///
    /// Always four labelled lines in name, email, phone, bio order; empty
    /// values still produce their line.
    pub fn encoded_text(&self, labels: &Labels) -> String {
        labels
            .keys()
            .iter()
            .zip(ProfileField::ALL)
            .map(|(key, field)| format!("{key}{KEY_SEPARATOR}{}", self.get(field)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Rebuild a record from encoded text produced with `labels`.
    ///
    /// The bio is everything after the phone line, so multi-line bios survive.
    pub fn parse_encoded(text: &str, labels: &Labels) -> Result<Self> {
        let mut rest = text;
        let mut record = ProfileRecord::default();

        for (key, field) in labels.keys().iter().zip(ProfileField::ALL) {
            let prefix = format!("{key}{KEY_SEPARATOR}");
            let body = rest.strip_prefix(prefix.as_str()).or_else(|| {
                // An empty value may have lost its trailing space in transit.
                rest.strip_prefix(key.trim_end())
                    .and_then(|r| r.strip_prefix(KEY_SEPARATOR.trim_end()))
                    .filter(|r| r.is_empty() || r.starts_with('\n'))
            });
            let Some(body) = body else {
                return Err(Error::InvalidProfileText(format!(
                    "expected '{key}' line for {field}"
                )));
            };

            if field == ProfileField::Bio {
                record.set(field, body);
                break;
            }

            let (value, remainder) = body.split_once('\n').ok_or_else(|| {
                Error::InvalidProfileText(format!("text ends after the {field} line"))
            })?;
            record.set(field, value);
            rest = remainder;
        }

        Ok(record)
    }

    /// Try every built-in locale until one parses
    pub fn parse_any_locale(text: &str) -> Result<(Self, Locale)> {
        let mut last_err = None;
        for locale in Locale::ALL {
            match Self::parse_encoded(text, &locale.labels()) {
                Ok(record) => return Ok((record, locale)),
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| Error::InvalidProfileText(text.to_string())))
    }
}

/// Owner of the live [`ProfileRecord`]
#[derive(Debug)]
pub struct ProfileForm {
    sender: watch::Sender<ProfileRecord>,
}

impl ProfileForm {
    /// Create an empty form
    pub fn new() -> Self {
        Self::with_record(ProfileRecord::default())
    }

    /// Create a form seeded with `record`
    pub fn with_record(record: ProfileRecord) -> Self {
        let (sender, _) = watch::channel(record);
        Self { sender }
    }

    /// Replace one attribute and notify every subscriber.
    ///
    /// Subscribers are woken even when the value is unchanged.
    pub fn update_field(&self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        tracing::trace!(%field, len = value.len(), "profile field updated");
        self.sender.send_modify(|record| record.set(field, value));
    }

    /// Widget-style change handler taking the raw field identifier
    pub fn handle_change(&self, field_id: &str, value: impl Into<String>) -> Result<()> {
        let field = field_id.parse::<ProfileField>()?;
        self.update_field(field, value);
        Ok(())
    }

    /// Snapshot of the current record
    pub fn snapshot(&self) -> ProfileRecord {
        self.sender.borrow().clone()
    }

    /// New receiver that observes every subsequent update
    pub fn subscribe(&self) -> watch::Receiver<ProfileRecord> {
        self.sender.subscribe()
    }
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self::new()
    }
}
