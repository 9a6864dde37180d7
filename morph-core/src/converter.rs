//! # Conversores de Tags
//!
//! Cada família de analisador representa suas tags de um jeito:
//!
//! | Família    | Forma da tag bruta                          | Exemplo                      |
//! |------------|---------------------------------------------|------------------------------|
//! | Mystem     | string plana, abreviações cirílicas         | `S,жен,неод=им,ед`           |
//! | OpenCorpora| objeto com campos nomeados                  | `{POS: NOUN, case: nomn}`    |
//!
//! Os dois conversores implementam [`TagConverter`] e consultam uma
//! [`TagMapping`] para chegar ao vocabulário UD.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConversionError, Result};
use crate::mapping::{Category, TagMapping, MYSTEM_MAPPING, OPENCORPORA_MAPPING};
use crate::ud::{Features, UdPos};

static LEADING_ATOM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+").expect("regex válida"));
static CYRILLIC_ATOM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[а-яё]+").expect("regex válida"));

/// Converte a tag nativa de um analisador para UPOS + features UD.
pub trait TagConverter {
    /// Representação bruta da tag produzida pelo analisador.
    type Tag;

    /// Extrai o átomo de classe gramatical e o resolve na categoria `POS`.
    fn convert_pos(&self, tag: &Self::Tag) -> std::result::Result<UdPos, ConversionError>;

    /// Extrai as categorias reconhecidas, descartando as sem mapeamento.
    fn convert_features(&self, tag: &Self::Tag) -> Features;
}

/// Conversor para as tags planas do Mystem.
#[derive(Debug, Clone)]
pub struct MystemTagConverter {
    mapping: TagMapping,
}

impl MystemTagConverter {
    pub fn new(mapping: TagMapping) -> Self {
        Self { mapping }
    }

    /// Usa a tabela embutida no crate.
    pub fn bundled() -> Result<Self> {
        TagMapping::from_json(MYSTEM_MAPPING, "mystem_tags_mapping.json").map(Self::new)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        TagMapping::from_path(path).map(Self::new)
    }
}

impl TagConverter for MystemTagConverter {
    type Tag = String;

    fn convert_pos(&self, tag: &String) -> std::result::Result<UdPos, ConversionError> {
        let atom = LEADING_ATOM
            .find(tag)
            .ok_or_else(|| ConversionError::MissingPos(tag.clone()))?
            .as_str();
        self.mapping
            .resolve_pos(atom)
            .ok_or_else(|| ConversionError::UnknownPos(atom.to_string()))
    }

    fn convert_features(&self, tag: &String) -> Features {
        let mut features = Features::new();
        // Átomos ambíguos da mesma categoria: o último vence.
        for atom in CYRILLIC_ATOM.find_iter(tag) {
            for category in Category::FEATURES {
                if let Some(value) = self.mapping.resolve(category, atom.as_str()) {
                    features.insert(category.key(), value);
                }
            }
        }
        features
    }
}

/// Tag estruturada no padrão OpenCorpora (a mesma forma exposta pelo pymorphy).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenCorporaTag {
    #[serde(rename = "POS", default)]
    pub pos: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub animacy: Option<String>,
    #[serde(default)]
    pub case: Option<String>,
    #[serde(default)]
    pub tense: Option<String>,
}

impl OpenCorporaTag {
    fn field(&self, category: Category) -> Option<&str> {
        match category {
            Category::Pos => self.pos.as_deref(),
            Category::Case => self.case.as_deref(),
            Category::Number => self.number.as_deref(),
            Category::Gender => self.gender.as_deref(),
            Category::Animacy => self.animacy.as_deref(),
            Category::Tense => self.tense.as_deref(),
        }
    }
}

/// Conversor para tags estruturadas OpenCorpora.
#[derive(Debug, Clone)]
pub struct OpenCorporaTagConverter {
    mapping: TagMapping,
}

impl OpenCorporaTagConverter {
    pub fn new(mapping: TagMapping) -> Self {
        Self { mapping }
    }

    pub fn bundled() -> Result<Self> {
        TagMapping::from_json(OPENCORPORA_MAPPING, "opencorpora_tags_mapping.json").map(Self::new)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        TagMapping::from_path(path).map(Self::new)
    }
}

impl TagConverter for OpenCorporaTagConverter {
    type Tag = OpenCorporaTag;

    fn convert_pos(&self, tag: &OpenCorporaTag) -> std::result::Result<UdPos, ConversionError> {
        let atom = tag
            .field(Category::Pos)
            .ok_or_else(|| ConversionError::MissingPos(format!("{tag:?}")))?;
        self.mapping
            .resolve_pos(atom)
            .ok_or_else(|| ConversionError::UnknownPos(atom.to_string()))
    }

    fn convert_features(&self, tag: &OpenCorporaTag) -> Features {
        let mut features = Features::new();
        for category in Category::FEATURES {
            let resolved = tag
                .field(category)
                .and_then(|raw| self.mapping.resolve(category, raw));
            if let Some(value) = resolved {
                features.insert(category.key(), value);
            }
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mystem() -> MystemTagConverter {
        MystemTagConverter::bundled().unwrap()
    }

    #[test]
    fn test_mystem_pos_from_leading_atom() {
        let converter = mystem();
        assert_eq!(converter.convert_pos(&"S,жен,неод=им,ед".to_string()), Ok(UdPos::Noun));
        assert_eq!(converter.convert_pos(&"V,несов,пе=непрош,ед,изъяв,3-л".to_string()), Ok(UdPos::Verb));
        assert_eq!(converter.convert_pos(&"SPRO,ед,1-л=им".to_string()), Ok(UdPos::Pron));
    }

    #[test]
    fn test_mystem_pos_failures() {
        let converter = mystem();
        assert_eq!(
            converter.convert_pos(&"=им".to_string()),
            Err(ConversionError::MissingPos("=им".to_string()))
        );
        assert_eq!(
            converter.convert_pos(&"ZZ,ед".to_string()),
            Err(ConversionError::UnknownPos("ZZ".to_string()))
        );
    }

    #[test]
    fn test_mystem_features_sorted_and_best_effort() {
        let converter = mystem();
        let features = converter.convert_features(&"S,жен,неод=им,ед".to_string());
        assert_eq!(features.to_string(), "Animacy=Inan|Case=Nom|Gender=Fem|Number=Sing");

        // "непрош", "несов", "изъяв" não têm mapeamento e somem
        let verb = converter.convert_features(&"V,несов,пе=непрош,ед,изъяв,3-л".to_string());
        assert_eq!(verb.to_string(), "Number=Sing");
    }

    #[test]
    fn test_mystem_features_deterministic() {
        let converter = mystem();
        let tag = "A=(вин,ед,полн,муж,од|род,ед,полн,муж)".to_string();
        let first = converter.convert_features(&tag).to_string();
        for _ in 0..5 {
            assert_eq!(converter.convert_features(&tag).to_string(), first);
        }
        // Case ambíguo: o último átomo ("род") prevalece
        assert_eq!(first, "Animacy=Anim|Case=Gen|Gender=Masc|Number=Sing");
    }

    #[test]
    fn test_mystem_no_features_gives_absence_marker() {
        let converter = mystem();
        assert_eq!(converter.convert_features(&"PR=".to_string()).to_string(), "_");
    }

    #[test]
    fn test_opencorpora_conversion() {
        let converter = OpenCorporaTagConverter::bundled().unwrap();
        let tag = OpenCorporaTag {
            pos: Some("NOUN".into()),
            gender: Some("femn".into()),
            number: Some("sing".into()),
            animacy: Some("inan".into()),
            case: Some("gent".into()),
            tense: None,
        };
        assert_eq!(converter.convert_pos(&tag), Ok(UdPos::Noun));
        assert_eq!(
            converter.convert_features(&tag).to_string(),
            "Animacy=Inan|Case=Gen|Gender=Fem|Number=Sing"
        );
    }

    #[test]
    fn test_opencorpora_missing_pos_and_unmapped_values() {
        let converter = OpenCorporaTagConverter::bundled().unwrap();
        let tag = OpenCorporaTag {
            case: Some("nomn".into()),
            gender: Some("ms-f".into()),
            ..Default::default()
        };
        assert!(matches!(converter.convert_pos(&tag), Err(ConversionError::MissingPos(_))));
        assert_eq!(converter.convert_features(&tag).to_string(), "Case=Nom");
    }

    #[test]
    fn test_opencorpora_tag_deserializes_pymorphy_shape() {
        let tag: OpenCorporaTag =
            serde_json::from_str(r#"{"POS": "VERB", "tense": "past", "number": "plur"}"#).unwrap();
        assert_eq!(tag.pos.as_deref(), Some("VERB"));
        assert_eq!(tag.tense.as_deref(), Some("past"));
        assert!(tag.case.is_none());
    }
}
