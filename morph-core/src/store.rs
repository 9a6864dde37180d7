//! # Armazenamento de Artefatos
//!
//! Todos os artefatos de um documento vivem no mesmo diretório e compartilham
//! o id como prefixo do nome:
//!
//! | Artefato                 | Arquivo                              |
//! |--------------------------|--------------------------------------|
//! | Texto bruto              | `{id}_raw.txt`                       |
//! | Metadados                | `{id}_meta.json`                     |
//! | Texto limpo              | `{id}_cleaned.txt`                   |
//! | CONLL-U sem features     | `{id}_pos_conllu.conllu`             |
//! | CONLL-U com features     | `{id}_morphological_conllu.conllu`   |
//! | Frequência de classes    | `{id}_pos_frequency.tsv`             |
//!
//! As escritas de documentos diferentes tocam caminhos disjuntos.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conllu::{parse_conllu, render_cleaned, render_conllu};
use crate::document::{ConlluSentence, Document, DocumentId};
use crate::error::{ConlluError, Error, Result};
use crate::ud::UdPos;

static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").expect("regex válida"));

/// Tipos de artefato por documento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Raw,
    Meta,
    Cleaned,
    PosConllu,
    MorphologicalConllu,
    PosFrequency,
}

impl ArtifactKind {
    /// Sufixo após `{id}` no nome do arquivo.
    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::Raw => "_raw.txt",
            ArtifactKind::Meta => "_meta.json",
            ArtifactKind::Cleaned => "_cleaned.txt",
            ArtifactKind::PosConllu => "_pos_conllu.conllu",
            ArtifactKind::MorphologicalConllu => "_morphological_conllu.conllu",
            ArtifactKind::PosFrequency => "_pos_frequency.tsv",
        }
    }

    pub fn file_name(&self, id: DocumentId) -> String {
        format!("{id}{}", self.suffix())
    }

    /// Variante CONLL-U correspondente ao modo de features.
    pub fn conllu(include_features: bool) -> Self {
        if include_features {
            ArtifactKind::MorphologicalConllu
        } else {
            ArtifactKind::PosConllu
        }
    }

    /// Prefixo do nome (o id ainda não interpretado), se o sufixo bater.
    pub fn id_prefix<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        file_name.strip_suffix(self.suffix())
    }
}

/// Metadados de um artigo, como lidos do disco.
///
/// É só uma visão de leitura: a fase de frequências grava via
/// [`DocumentStore::extend_meta`], que não passa por esta struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleMeta {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "tolerant_date", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech_frequency: Option<BTreeMap<UdPos, usize>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Datas fora de `YYYY-MM-DD HH:MM:SS` ficam sem valor em vez de falhar.
fn tolerant_date<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(date)) if DATE.is_match(&date) => Some(date),
        _ => None,
    })
}

/// `3_pos_conllu.conllu` → `3_pos_conllu.conllu.tmp`
fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Leitura e escrita dos artefatos de um diretório de dados.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, id: DocumentId, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.file_name(id))
    }

    pub fn read_raw(&self, id: DocumentId) -> Result<Document> {
        let text = fs::read_to_string(self.path(id, ArtifactKind::Raw))?;
        Ok(Document::new(id, text))
    }

    /// Grava texto limpo e as duas variantes CONLL-U.
    ///
    /// Tudo é renderizado e gravado em arquivos `.tmp` antes de qualquer
    /// rename; se uma escrita falha, nenhum artefato final aparece.
    pub fn persist_annotations(&self, document: &Document) -> Result<()> {
        let id = document.id();
        let sentences = document.sentences();
        let artifacts = [
            (ArtifactKind::Cleaned, render_cleaned(sentences)),
            (ArtifactKind::PosConllu, render_conllu(sentences, false)),
            (ArtifactKind::MorphologicalConllu, render_conllu(sentences, true)),
        ];

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(artifacts.len());
        for (kind, content) in &artifacts {
            let target = self.path(id, *kind);
            let staging = staging_path(&target);
            if let Err(e) = fs::write(&staging, content) {
                let _ = fs::remove_file(&staging);
                for (written, _) in &staged {
                    let _ = fs::remove_file(written);
                }
                return Err(e.into());
            }
            staged.push((staging, target));
        }

        for (staging, target) in &staged {
            fs::rename(staging, target)?;
        }
        debug!(document = %id, "artefatos gravados");
        Ok(())
    }

    pub fn read_conllu(&self, id: DocumentId, include_features: bool) -> Result<Vec<ConlluSentence>> {
        let text = fs::read_to_string(self.path(id, ArtifactKind::conllu(include_features)))?;
        if text.is_empty() {
            return Err(ConlluError::EmptyFile.into());
        }
        Ok(parse_conllu(&text)?)
    }

    pub fn read_meta(&self, id: DocumentId) -> Result<ArticleMeta> {
        let json = fs::read_to_string(self.path(id, ArtifactKind::Meta))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Acrescenta `part_of_speech_frequency` ao objeto de metadados.
    ///
    /// Opera sobre o JSON cru: os demais campos voltam ao disco como estavam,
    /// inclusive datas fora do formato e campos ausentes.
    pub fn extend_meta(&self, id: DocumentId, frequency: &BTreeMap<UdPos, usize>) -> Result<()> {
        let path = self.path(id, ArtifactKind::Meta);
        let mut value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        let object = value.as_object_mut().ok_or_else(|| Error::Meta {
            id,
            reason: "esperava um objeto JSON".to_string(),
        })?;
        object.insert("part_of_speech_frequency".to_string(), serde_json::to_value(frequency)?);

        fs::write(&path, serde_json::to_string_pretty(&value)?)?;
        Ok(())
    }
}
