//! # Tabela de Mapeamento de Tags
//!
//! Dicionário `{categoria → {tag_bruta → valor UD}}` carregado de um recurso
//! JSON estático. A consulta é uma função pura: entradas ausentes simplesmente
//! não geram feature (política "melhor esforço"), pois nem toda tag do
//! analisador tem correspondente em UD.
//!
//! ```json
//! { "POS": { "S": "NOUN" }, "Case": { "им": "Nom" } }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::ud::UdPos;

/// Tabela embutida para o analisador Mystem.
pub const MYSTEM_MAPPING: &str = include_str!("../data/mystem_tags_mapping.json");
/// Tabela embutida para tags no padrão OpenCorpora.
pub const OPENCORPORA_MAPPING: &str = include_str!("../data/opencorpora_tags_mapping.json");

/// Categorias semânticas reconhecidas na tabela.
///
/// O nome de cada categoria é também o nome da feature UD emitida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Pos,
    Case,
    Number,
    Gender,
    Animacy,
    Tense,
}

impl Category {
    /// Categorias que viram features (todas exceto a classe gramatical).
    pub const FEATURES: [Category; 5] = [
        Category::Case,
        Category::Number,
        Category::Gender,
        Category::Animacy,
        Category::Tense,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Pos => "POS",
            Category::Case => "Case",
            Category::Number => "Number",
            Category::Gender => "Gender",
            Category::Animacy => "Animacy",
            Category::Tense => "Tense",
        }
    }
}

/// Tabela somente-leitura, segura para acesso concorrente.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagMapping {
    table: HashMap<String, HashMap<String, String>>,
}

impl TagMapping {
    /// Carrega a tabela de um arquivo JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let json = fs::read_to_string(path).map_err(|e| Error::Mapping {
            path: source.clone(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json, &source)
    }

    /// Interpreta o JSON e valida os valores de `POS`.
    ///
    /// `source` aparece apenas nas mensagens de erro.
    pub fn from_json(json: &str, source: &str) -> Result<Self> {
        let table: HashMap<String, HashMap<String, String>> =
            serde_json::from_str(json).map_err(|e| Error::Mapping {
                path: source.to_string(),
                reason: e.to_string(),
            })?;

        let pos = table.get(Category::Pos.key()).ok_or_else(|| Error::Mapping {
            path: source.to_string(),
            reason: "categoria POS ausente".to_string(),
        })?;
        if let Some((raw, value)) = pos.iter().find(|(_, v)| v.parse::<UdPos>().is_err()) {
            return Err(Error::Mapping {
                path: source.to_string(),
                reason: format!("{raw:?} aponta para classe UD desconhecida {value:?}"),
            });
        }

        Ok(Self { table })
    }

    /// Resolve uma tag bruta dentro de uma categoria.
    pub fn resolve(&self, category: Category, raw_tag: &str) -> Option<&str> {
        self.table
            .get(category.key())
            .and_then(|entries| entries.get(raw_tag))
            .map(String::as_str)
    }

    /// Resolve a classe gramatical já tipada.
    pub fn resolve_pos(&self, raw_tag: &str) -> Option<UdPos> {
        self.resolve(Category::Pos, raw_tag)
            .and_then(|value| value.parse().ok())
    }
}
