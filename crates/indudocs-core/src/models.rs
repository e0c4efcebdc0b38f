//! Core data models used throughout InduDocs.
//!
//! These are plain records with no behaviour beyond small exhaustive
//! lookups on the closed enums ([`Role`], [`DocType`], [`Language`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An operational location that documents and users are scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Role of a user. Administrators see every site and may edit; operators
/// are read-only and restricted to their own site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Operario,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Operario => "OPERARIO",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "OPERARIO" => Ok(Role::Operario),
            other => Err(format!(
                "unknown role '{}'. Must be ADMIN or OPERARIO.",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
    /// The single site an operator may view. Ignored for administrators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_affinity: Option<String>,
}

/// Kind of industrial document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocType {
    WorkInstruction,
    SafetySheet,
    TechSheet,
    MachineManual,
}

impl DocType {
    /// All document types, in the order the type filter chips are shown.
    pub const ALL: [DocType; 4] = [
        DocType::WorkInstruction,
        DocType::SafetySheet,
        DocType::TechSheet,
        DocType::MachineManual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::WorkInstruction => "WORK_INSTRUCTION",
            DocType::SafetySheet => "SAFETY_SHEET",
            DocType::TechSheet => "TECH_SHEET",
            DocType::MachineManual => "MACHINE_MANUAL",
        }
    }

    /// Localization key for this type's label.
    pub fn label_key(&self) -> &'static str {
        match self {
            DocType::WorkInstruction => "doc_type_instruccion",
            DocType::SafetySheet => "doc_type_fds",
            DocType::TechSheet => "doc_type_ft",
            DocType::MachineManual => "doc_type_manual",
        }
    }

    /// Official document-type name, used in assistant prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            DocType::WorkInstruction => "Instrucción de Trabajo",
            DocType::SafetySheet => "Ficha de Seguridad (FDS)",
            DocType::TechSheet => "Ficha Técnica (FT)",
            DocType::MachineManual => "Manual de Máquina",
        }
    }

    /// Badge colour name for listings.
    pub fn badge_color(&self) -> &'static str {
        match self {
            DocType::WorkInstruction => "emerald",
            DocType::SafetySheet => "rose",
            DocType::TechSheet => "sky",
            DocType::MachineManual => "amber",
        }
    }

    /// Short glyph shown next to the type in terminal listings.
    pub fn icon(&self) -> &'static str {
        match self {
            DocType::WorkInstruction => "[IT]",
            DocType::SafetySheet => "[!!]",
            DocType::TechSheet => "[FT]",
            DocType::MachineManual => "[MM]",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase().replace('-', "_");
        DocType::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| {
                format!(
                    "unknown document type '{}'. Must be one of WORK_INSTRUCTION, SAFETY_SHEET, TECH_SHEET, MACHINE_MANUAL.",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: DocType,
    pub category: String,
    pub external_url: String,
    #[serde(default)]
    pub description: String,
    pub last_updated: NaiveDate,
    pub site_id: String,
}

/// Interface language. Also passed to the assistant as the response
/// language tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    Fr,
    Ar,
    Wo,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::Es, Language::Fr, Language::Ar, Language::Wo];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::Fr => "fr",
            Language::Ar => "ar",
            Language::Wo => "wo",
        }
    }

    /// Three-letter label shown in the language picker.
    pub fn label(&self) -> &'static str {
        match self {
            Language::Es => "ESP",
            Language::Fr => "FRA",
            Language::Ar => "MAR",
            Language::Wo => "WOL",
        }
    }

    /// Greeting the chat assistant opens with.
    pub fn welcome(&self) -> &'static str {
        match self {
            Language::Es => "Hola, soy el asistente de InduDocs. ¿En qué puedo ayudarte?",
            Language::Fr => "Bonjour, je suis l'assistant InduDocs. Comment puis-je vous aider ?",
            Language::Ar => "السلام، أنا مساعد InduDocs. كيف نقدر نعاونك؟",
            Language::Wo => "Salaam aleekum, maa ngi nekk ndimbalu InduDocs. Lan laa la mën a defal?",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|l| l.code() == s)
            .ok_or_else(|| format!("unknown language '{}'. Must be es, fr, ar or wo.", s))
    }
}
