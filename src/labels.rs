//! Localised text used by the form, the encoded payload and user alerts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in label sets
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Arabic, right-to-left
    #[default]
    Ar,
    /// English
    En,
}

impl Locale {
    /// All built-in locales, in lookup order for read-back
    pub const ALL: [Locale; 2] = [Locale::Ar, Locale::En];

    /// Short identifier (`ar`, `en`)
    pub fn id(self) -> &'static str {
        match self {
            Locale::Ar => "ar",
            Locale::En => "en",
        }
    }

    /// Labels shipped for this locale
    pub fn labels(self) -> Labels {
        match self {
            Locale::Ar => Labels::arabic(),
            Locale::En => Labels::english(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ar" | "arabic" => Ok(Locale::Ar),
            "en" | "english" => Ok(Locale::En),
            other => Err(format!("Unsupported locale '{other}', expected 'ar' or 'en'")),
        }
    }
}

/// Every user-facing string the pipeline and the form need.
///
/// The `*_key` strings prefix each line of the encoded text. They are kept
/// separate from the form labels because the payload uses a shorter bio label
/// than the form does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Labels {
    /// Encoded-text prefix for the full name line
    pub name_key: String,
    /// Encoded-text prefix for the email line
    pub email_key: String,
    /// Encoded-text prefix for the phone line
    pub phone_key: String,
    /// Encoded-text prefix for the bio line
    pub bio_key: String,
    /// Form label for the full name input
    pub name_field: String,
    /// Form label for the email input
    pub email_field: String,
    /// Form label for the phone input
    pub phone_field: String,
    /// Form label for the bio textarea
    pub bio_field: String,
    /// Display names for 128, 256, 512 and 1024
    pub size_names: [String; 4],
    /// Shown in place of the preview while the profile is empty
    pub empty_placeholder: String,
    /// Alert raised when an export cannot be encoded
    pub export_failed: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self::arabic()
    }
}

impl Labels {
    /// Arabic label set
    pub fn arabic() -> Self {
        Self {
            name_key: "الاسم الكامل".to_string(),
            email_key: "البريد الإلكتروني".to_string(),
            phone_key: "رقم الموبايل".to_string(),
            bio_key: "نبذة تعريفية".to_string(),
            name_field: "الاسم الكامل".to_string(),
            email_field: "البريد الإلكتروني".to_string(),
            phone_field: "رقم الموبايل".to_string(),
            bio_field: "نبذة تعريفية قصيرة".to_string(),
            size_names: [
                "صغير".to_string(),
                "متوسط".to_string(),
                "كبير".to_string(),
                "كبير جدًا".to_string(),
            ],
            empty_placeholder: "أدخل بياناتك في النموذج لعرض رمز QR.".to_string(),
            export_failed: "حدث خطأ أثناء إنشاء رمز QR. يرجى المحاولة مرة أخرى.".to_string(),
        }
    }

    /// English label set
    pub fn english() -> Self {
        Self {
            name_key: "Full Name".to_string(),
            email_key: "Email".to_string(),
            phone_key: "Phone".to_string(),
            bio_key: "Bio".to_string(),
            name_field: "Full name".to_string(),
            email_field: "Email address".to_string(),
            phone_field: "Mobile number".to_string(),
            bio_field: "Short bio".to_string(),
            size_names: [
                "Small".to_string(),
                "Medium".to_string(),
                "Large".to_string(),
                "Extra large".to_string(),
            ],
            empty_placeholder: "Fill in the form to see your QR code.".to_string(),
            export_failed: "Something went wrong while generating the QR code. Please try again."
                .to_string(),
        }
    }

    /// Payload prefixes in encoded-text order
    pub fn keys(&self) -> [&str; 4] {
        [
            self.name_key.as_str(),
            self.email_key.as_str(),
            self.phone_key.as_str(),
            self.bio_key.as_str(),
        ]
    }
}

/// Per-string replacements applied on top of a locale's labels
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LabelOverrides {
    /// Replacement for [`Labels::name_key`]
    pub name_key: Option<String>,
    /// Replacement for [`Labels::email_key`]
    pub email_key: Option<String>,
    /// Replacement for [`Labels::phone_key`]
    pub phone_key: Option<String>,
    /// Replacement for [`Labels::bio_key`]
    pub bio_key: Option<String>,
    /// Replacement for [`Labels::name_field`]
    pub name_field: Option<String>,
    /// Replacement for [`Labels::email_field`]
    pub email_field: Option<String>,
    /// Replacement for [`Labels::phone_field`]
    pub phone_field: Option<String>,
    /// Replacement for [`Labels::bio_field`]
    pub bio_field: Option<String>,
    /// Replacement for all four [`Labels::size_names`]
    pub size_names: Option<[String; 4]>,
    /// Replacement for [`Labels::empty_placeholder`]
    pub empty_placeholder: Option<String>,
    /// Replacement for [`Labels::export_failed`]
    pub export_failed: Option<String>,
}

impl LabelOverrides {
    /// Overwrite every label that has a replacement set
    pub fn apply(&self, labels: &mut Labels) {
        let pairs = [
            (&self.name_key, &mut labels.name_key),
            (&self.email_key, &mut labels.email_key),
            (&self.phone_key, &mut labels.phone_key),
            (&self.bio_key, &mut labels.bio_key),
            (&self.name_field, &mut labels.name_field),
            (&self.email_field, &mut labels.email_field),
            (&self.phone_field, &mut labels.phone_field),
            (&self.bio_field, &mut labels.bio_field),
            (&self.empty_placeholder, &mut labels.empty_placeholder),
            (&self.export_failed, &mut labels.export_failed),
        ];
        for (replacement, target) in pairs {
            if let Some(value) = replacement {
                *target = value.clone();
            }
        }
        if let Some(names) = &self.size_names {
            labels.size_names = names.clone();
        }
    }
}
