//! # Gerenciador de Corpus
//!
//! Valida um diretório de dados e carrega os textos brutos em memória.
//!
//! ## Validação (nesta ordem, antes de ler qualquer documento)
//!
//! 1. O caminho existe e é um diretório.
//! 2. Há tantos arquivos `*_meta.json` quanto `*_raw.txt`.
//! 3. Nenhum dos dois conjuntos é vazio.
//! 4. Os ids dos arquivos brutos são numéricos, positivos e sem duplicatas.
//! 5. Os ids dos brutos e dos metadados são os mesmos.
//! 6. Nenhum arquivo bruto tem tamanho zero.
//!
//! Qualquer violação aborta a carga; nenhum corpus parcial é devolvido.
//! A carga não lê metadados nem anota nada: essas fases são explícitas
//! ([`crate::pipeline`]).

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::document::{Corpus, Document, DocumentId};
use crate::error::{DatasetError, Error, Inconsistency, Result};
use crate::store::{ArtifactKind, DocumentStore};

/// Um arquivo do dataset e o prefixo de id extraído do nome.
struct Entry {
    path: PathBuf,
    prefix: String,
}

/// Dono do corpus em memória e do armazenamento de onde ele veio.
#[derive(Debug, Clone)]
pub struct CorpusManager {
    store: DocumentStore,
    documents: Corpus,
}

impl CorpusManager {
    /// Valida o diretório e carrega todos os textos brutos.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw_files = validate_dataset(path)?;

        let store = DocumentStore::new(path);
        let mut documents = Corpus::new();
        for (id, raw_path) in raw_files {
            let text = fs::read_to_string(&raw_path)?;
            documents.insert(id, Document::new(id, text));
        }

        info!(path = %path.display(), documents = documents.len(), "corpus carregado");
        Ok(Self { store, documents })
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn documents(&self) -> &Corpus {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut Corpus {
        &mut self.documents
    }

    pub fn document(&self, id: DocumentId) -> Result<&Document> {
        self.documents.get(&id).ok_or(Error::UnknownDocument(id))
    }

    pub fn ids(&self) -> Vec<DocumentId> {
        self.documents.keys().copied().collect()
    }
}

fn inconsistent(kind: Inconsistency) -> DatasetError {
    DatasetError::InconsistentDataset(kind)
}

/// Lista os arquivos de um tipo de artefato no diretório.
fn list_artifacts(dir: &Path, kind: ArtifactKind) -> std::result::Result<Vec<Entry>, DatasetError> {
    let mut entries = Vec::new();
    for item in fs::read_dir(dir)? {
        let item = item?;
        if !item.file_type()?.is_file() {
            continue;
        }
        let name = item.file_name().to_string_lossy().into_owned();
        if let Some(prefix) = kind.id_prefix(&name) {
            entries.push(Entry {
                path: item.path(),
                prefix: prefix.to_string(),
            });
        }
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn parse_ids(entries: &[Entry]) -> std::result::Result<Vec<DocumentId>, DatasetError> {
    entries
        .iter()
        .map(|entry| {
            entry.prefix.parse::<DocumentId>().map_err(|_| {
                let name = entry
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                inconsistent(Inconsistency::UnparsableName(name))
            })
        })
        .collect()
}

/// Aplica as regras de validação e devolve `(id, caminho)` dos brutos.
pub fn validate_dataset(path: &Path) -> std::result::Result<Vec<(DocumentId, PathBuf)>, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(DatasetError::NotADirectory(path.to_path_buf()));
    }

    let meta_files = list_artifacts(path, ArtifactKind::Meta)?;
    let raw_files = list_artifacts(path, ArtifactKind::Raw)?;

    if meta_files.len() != raw_files.len() {
        return Err(inconsistent(Inconsistency::CountMismatch {
            raw: raw_files.len(),
            meta: meta_files.len(),
        }));
    }
    if meta_files.is_empty() || raw_files.is_empty() {
        return Err(DatasetError::EmptyDirectory(path.to_path_buf()));
    }

    let raw_ids = parse_ids(&raw_files)?;
    let mut seen = HashSet::new();
    let duplicates: BTreeSet<DocumentId> =
        raw_ids.iter().copied().filter(|id| !seen.insert(*id)).collect();
    if !duplicates.is_empty() {
        return Err(inconsistent(Inconsistency::DuplicateIds(duplicates.into_iter().collect())));
    }

    let meta_ids: BTreeSet<DocumentId> = parse_ids(&meta_files)?.into_iter().collect();
    let raw_set: BTreeSet<DocumentId> = raw_ids.iter().copied().collect();
    if meta_ids != raw_set {
        return Err(inconsistent(Inconsistency::MismatchedIds));
    }

    let mut empty = Vec::new();
    for entry in &raw_files {
        if fs::metadata(&entry.path)?.len() == 0 {
            empty.push(entry.path.clone());
        }
    }
    if !empty.is_empty() {
        return Err(inconsistent(Inconsistency::EmptyFiles(empty)));
    }

    Ok(raw_ids
        .into_iter()
        .zip(raw_files.into_iter().map(|entry| entry.path))
        .collect())
}
