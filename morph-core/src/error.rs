//! # Taxonomia de Erros
//!
//! O pipeline distingue três famílias de falha:
//!
//! - **Fatais de carga** ([`DatasetError`], [`Error::Mapping`]): abortam a carga
//!   do corpus inteiro ou a construção do conversor.
//! - **Fatais por documento** ([`Error::AnalyzerExhausted`], [`Error::Analyzer`]):
//!   o documento afetado é descartado sem escrever artefatos parciais.
//! - **Degradáveis por token** ([`ConversionError`]): absorvidas localmente pelo
//!   motor de alinhamento, nunca chegam ao chamador.

use std::path::PathBuf;

use thiserror::Error;

use crate::document::DocumentId;

/// Erro raiz do crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Tabela de mapeamento ausente ou malformada.
    #[error("tabela de mapeamento inválida ({path}): {reason}")]
    Mapping { path: String, reason: String },

    /// O fluxo do analisador acabou antes da tokenização independente.
    #[error("fluxo do analisador esgotado na sentença {sentence} (palavra {word:?})")]
    AnalyzerExhausted { sentence: usize, word: String },

    /// Falha ao invocar o analisador externo.
    #[error("falha no analisador: {0}")]
    Analyzer(String),

    #[error(transparent)]
    Conllu(#[from] ConlluError),

    #[error("configuração inválida: {0}")]
    Config(#[from] config::ConfigError),

    /// Arquivo de metadados que não é um objeto JSON.
    #[error("metadados inválidos do documento {id}: {reason}")]
    Meta { id: DocumentId, reason: String },

    #[error("documento {0} não está no corpus")]
    UnknownDocument(DocumentId),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Violações estruturais do diretório de dados.
///
/// `EmptyDirectory` e `InconsistentDataset` são separados para que o chamador
/// diferencie "nada a fazer" de "dados malformados".
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("diretório não encontrado: {}", .0.display())]
    NotFound(PathBuf),

    #[error("o caminho não é um diretório: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("diretório vazio: {}", .0.display())]
    EmptyDirectory(PathBuf),

    #[error("dataset inconsistente: {0}")]
    InconsistentDataset(Inconsistency),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Qual invariante do dataset foi violado.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Inconsistency {
    #[error("{raw} arquivos brutos para {meta} arquivos de metadados")]
    CountMismatch { raw: usize, meta: usize },

    #[error("ids duplicados: {}", join_ids(.0))]
    DuplicateIds(Vec<DocumentId>),

    #[error("ids dos arquivos brutos e de metadados não coincidem")]
    MismatchedIds,

    #[error("nome sem id numérico: {0}")]
    UnparsableName(String),

    #[error("arquivos vazios: {}", join_paths(.0))]
    EmptyFiles(Vec<PathBuf>),
}

fn join_ids(ids: &[DocumentId]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Falha ao converter a tag de um único token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("tag sem classe gramatical: {0:?}")]
    MissingPos(String),

    #[error("classe gramatical sem correspondente UD: {0:?}")]
    UnknownPos(String),
}

/// Artefato tabular malformado.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConlluError {
    #[error("linha {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("arquivo CONLL-U vazio")]
    EmptyFile,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inconsistency_messages_name_the_violation() {
        let err = DatasetError::InconsistentDataset(Inconsistency::CountMismatch { raw: 3, meta: 2 });
        assert_eq!(
            err.to_string(),
            "dataset inconsistente: 3 arquivos brutos para 2 arquivos de metadados"
        );

        let dup = Inconsistency::DuplicateIds(vec![DocumentId::new(5).unwrap(), DocumentId::new(7).unwrap()]);
        assert_eq!(dup.to_string(), "ids duplicados: 5, 7");

        let empty = Inconsistency::EmptyFiles(vec![PathBuf::from("a/1_raw.txt")]);
        assert_eq!(empty.to_string(), "arquivos vazios: a/1_raw.txt");
    }

    #[test]
    fn test_dataset_error_converts_into_root_error() {
        let err: Error = DatasetError::EmptyDirectory(PathBuf::from("/tmp/x")).into();
        assert!(matches!(err, Error::Dataset(DatasetError::EmptyDirectory(_))));
    }
}
